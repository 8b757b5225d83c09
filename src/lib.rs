//! Threshold-signature toolkit for Safe-style multisig verifiers.
//!
//! A set of independent key holders jointly authorizes one on-chain action:
//! the [`builder`] normalizes intents into a canonical transaction record,
//! [`hashing`] derives the typed-data hash every signer reproduces,
//! [`signatures`] collects heterogeneous signature kinds and merges them
//! into the canonical blob the verifier accepts, and the [`planner`]
//! validates the result against the current owner set before emitting the
//! final `execTransaction` call. Per-version encoding rules and deployed
//! contract addresses come from the [`registry`].
//!
//! Hashing, building and aggregation are pure and stateless; anything that
//! touches the network goes through the [`provider::RpcProvider`] trait or
//! the [`relay::RelayClient`] collaborator.

pub mod builder;
pub mod contracts;
pub mod errors;
pub mod hashing;
pub mod multisend;
pub mod planner;
pub mod provider;
pub mod registry;
pub mod relay;
pub mod signatures;
pub mod types;
pub mod utils;
pub mod verifier;

pub use builder::SafeTransactionBuilder;
pub use errors::{DecodeError, Error, ProviderError};
pub use hashing::{safe_message_hash, safe_tx_hash};
pub use planner::{prepare, ExecutionPlan};
pub use provider::RpcProvider;
pub use registry::{VersionContracts, VersionRegistry};
pub use relay::RelayClient;
pub use signatures::{
    sign, LocalSigner, SafeSignature, SignatureKind, SignatureSet, SignerIdentity, SigningScheme,
};
pub use types::{
    MetaTransactionData, OperationType, SafeTransactionData, SafeTransactionOptions, SafeVersion,
};
pub use verifier::VerifierReader;
