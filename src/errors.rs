//! Error taxonomy for the kit.
//!
//! Every local validation failure is raised before any network side effect,
//! and carries enough context (signer, threshold counts, hash) for a caller
//! to present an actionable message without re-deriving it.

use alloy_primitives::{Address, B256};
use thiserror::Error;

/// Errors while parsing packed byte payloads (multi-send data, signature blobs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("payload truncated")]
    Truncated,
    #[error("unknown operation byte {0}")]
    UnknownOperation(u8),
    #[error("dynamic offset {0} out of bounds")]
    BadOffset(usize),
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(String),

    #[error("transaction built from an empty intent list")]
    EmptyIntentList,

    #[error("nested DelegateCall in batched sub-call to {to}")]
    UnsupportedNestedDelegateCall { to: Address },

    #[error("signature over {hash} recovered {recovered}, expected {expected}")]
    SignatureMismatch {
        hash: B256,
        expected: Address,
        recovered: Address,
    },

    #[error("insufficient signatures: have {have}, threshold {threshold}")]
    InsufficientSignatures { have: usize, threshold: usize },

    #[error("conflicting signature for signer {signer}")]
    ConflictingSignature { signer: Address },

    #[error("threshold not met for {hash}: {valid} valid of {threshold} required")]
    ThresholdNotMet {
        hash: B256,
        valid: usize,
        threshold: usize,
    },

    #[error("signer {signer} is not a current owner")]
    UnknownSigner { signer: Address },

    #[error("invalid transaction hash: {0:?}")]
    InvalidHash(String),

    #[error("transaction not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure surfaced by an RPC/HTTP collaborator, passed through unmodified.
///
/// Retry policy, if any, belongs to the collaborator, not to this crate.
#[derive(Debug, Error)]
#[error("provider error: {message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
