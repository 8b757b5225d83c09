//! Core data model: transaction intents, the canonical on-chain transaction
//! record, and the closed set of supported protocol versions.

use core::fmt;
use core::str::FromStr;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::errors::{DecodeError, Error};

/// Call semantics of a transaction against the verifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationType {
    Call = 0,
    DelegateCall = 1,
}

impl OperationType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for OperationType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, DecodeError> {
        match value {
            0 => Ok(OperationType::Call),
            1 => Ok(OperationType::DelegateCall),
            other => Err(DecodeError::UnknownOperation(other)),
        }
    }
}

/// A single user-supplied call, before normalization by the builder.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationType,
}

/// The canonical single-call form submitted on-chain.
///
/// Immutable once signatures start accumulating: changing any field changes
/// the transaction hash and invalidates every collected signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SafeTransactionData {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: OperationType,
    pub safe_tx_gas: U256,
    pub base_gas: U256,
    pub gas_price: U256,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: U256,
}

/// Optional execution parameters for the builder.
///
/// Unset gas fields default to 0 (self-funded execution, relayer pays);
/// an unset nonce defaults to the verifier's next sequential nonce.
#[derive(Clone, Debug, Default)]
pub struct SafeTransactionOptions {
    pub safe_tx_gas: Option<U256>,
    pub base_gas: Option<U256>,
    pub gas_price: Option<U256>,
    pub gas_token: Option<Address>,
    pub refund_receiver: Option<Address>,
    pub nonce: Option<U256>,
}

/// Historical protocol versions of the verifier contract, as a closed set.
///
/// The tag determines struct-hash layout, domain-separator shape and which
/// deployed contract addresses apply. Versions before 1.3.0 predate
/// chain-bound domains and omit `chainId` from the domain separator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SafeVersion {
    V1_1_1,
    V1_2_0,
    V1_3_0,
    V1_4_1,
}

impl SafeVersion {
    /// Whether the domain separator binds the chain id.
    pub fn is_chain_bound(self) -> bool {
        matches!(self, SafeVersion::V1_3_0 | SafeVersion::V1_4_1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SafeVersion::V1_1_1 => "1.1.1",
            SafeVersion::V1_2_0 => "1.2.0",
            SafeVersion::V1_3_0 => "1.3.0",
            SafeVersion::V1_4_1 => "1.4.1",
        }
    }
}

impl fmt::Display for SafeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SafeVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "1.1.1" => Ok(SafeVersion::V1_1_1),
            "1.2.0" => Ok(SafeVersion::V1_2_0),
            "1.3.0" => Ok(SafeVersion::V1_3_0),
            "1.4.1" => Ok(SafeVersion::V1_4_1),
            other => Err(Error::UnsupportedVersion(other.to_owned())),
        }
    }
}
