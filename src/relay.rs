//! Transaction-relay service client.
//!
//! The core hands the relay a fully built `{safeTxHash, transaction,
//! aggregatedSignature}` for off-chain storage and propagation, and can
//! fetch a transaction back by its hash. Input validation happens before
//! any request is made; transport failures surface as provider errors,
//! unmodified and unretried.

use alloy_primitives::{Address, B256};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, ProviderError};
use crate::types::SafeTransactionData;

/// Wire form of a transaction record, with stringified uint fields as the
/// relay service expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTransactionData {
    pub to: Address,
    pub value: String,
    pub data: String,
    pub operation: u8,
    pub safe_tx_gas: String,
    pub base_gas: String,
    pub gas_price: String,
    pub gas_token: Address,
    pub refund_receiver: Address,
    pub nonce: String,
}

impl From<&SafeTransactionData> for RelayTransactionData {
    fn from(tx: &SafeTransactionData) -> Self {
        Self {
            to: tx.to,
            value: tx.value.to_string(),
            data: format!("0x{}", hex::encode(&tx.data)),
            operation: tx.operation.as_u8(),
            safe_tx_gas: tx.safe_tx_gas.to_string(),
            base_gas: tx.base_gas.to_string(),
            gas_price: tx.gas_price.to_string(),
            gas_token: tx.gas_token,
            refund_receiver: tx.refund_receiver,
            nonce: tx.nonce.to_string(),
        }
    }
}

/// Body of a `proposeTransaction` call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeTransactionBody {
    pub safe: Address,
    #[serde(flatten)]
    pub transaction: RelayTransactionData,
    pub contract_transaction_hash: B256,
    pub sender: Address,
    /// Hex-encoded aggregated (or single) signature blob.
    pub signature: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// A stored transaction as returned by the relay.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayTransaction {
    pub safe: Address,
    pub safe_tx_hash: String,
    #[serde(flatten)]
    pub transaction: RelayTransactionData,
    #[serde(default)]
    pub is_executed: bool,
    #[serde(default)]
    pub confirmations_required: Option<u64>,
}

/// HTTP client for the relay service.
#[derive(Clone, Debug)]
pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    // Empty or non-hex hashes never leave the process; whether a
    // well-formed hash is known is the relay's call.
    fn checked_hash(safe_tx_hash: &str) -> Result<&str, Error> {
        let digits = safe_tx_hash
            .strip_prefix("0x")
            .unwrap_or(safe_tx_hash);
        if safe_tx_hash.trim().is_empty()
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(Error::InvalidHash(safe_tx_hash.to_owned()));
        }
        Ok(safe_tx_hash)
    }

    /// Store a signed transaction for propagation to the other owners.
    pub async fn propose_transaction(&self, body: &ProposeTransactionBody) -> Result<(), Error> {
        let url = format!(
            "{}/api/v1/safes/{}/multisig-transactions/",
            self.base_url, body.safe
        );
        debug!(safe = %body.safe, hash = %body.contract_transaction_hash, "proposing transaction");
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::new(format!(
                "relay rejected proposal: HTTP {}",
                response.status()
            ))
            .into())
        }
    }

    /// Fetch a stored transaction by its hash.
    ///
    /// An empty or non-hex hash is rejected locally with `InvalidHash`; a
    /// well-formed hash the relay does not know yields `NotFound`.
    pub async fn get_transaction(&self, safe_tx_hash: &str) -> Result<RelayTransaction, Error> {
        let hash = Self::checked_hash(safe_tx_hash)?;
        let url = format!("{}/api/v1/multisig-transactions/{}/", self.base_url, hash);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::new(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(hash.to_owned())),
            status if status.is_success() => response
                .json::<RelayTransaction>()
                .await
                .map_err(|e| ProviderError::new(e.to_string()).into()),
            status => Err(ProviderError::new(format!("relay lookup failed: HTTP {status}")).into()),
        }
    }
}
