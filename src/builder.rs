//! Normalizes user-supplied intents into one canonical transaction record.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::contracts::IMultiSend;
use crate::errors::Error;
use crate::multisend::encode_multi_send;
use crate::provider::RpcProvider;
use crate::registry::VersionRegistry;
use crate::types::{
    MetaTransactionData, OperationType, SafeTransactionData, SafeTransactionOptions, SafeVersion,
};

/// Builds `SafeTransactionData` from one or more intents.
///
/// A multi-call intent is collapsed into a single DelegateCall to the
/// batching helper; a single intent passes through unchanged.
#[derive(Clone, Copy, Debug)]
pub struct SafeTransactionBuilder {
    batch_target: Address,
}

impl SafeTransactionBuilder {
    pub fn new(batch_target: Address) -> Self {
        Self { batch_target }
    }

    /// Resolve the batching helper for a version/chain from the registry.
    pub fn from_registry(registry: &VersionRegistry, version: SafeVersion, chain_id: u64) -> Self {
        Self::new(registry.contracts(version, chain_id).batch_target())
    }

    /// Build the canonical record. `next_nonce` is used when the options do
    /// not pin a nonce; callers resolve it from the verifier beforehand (or
    /// use [`build_with_provider`](Self::build_with_provider)).
    pub fn build(
        &self,
        intents: &[MetaTransactionData],
        options: &SafeTransactionOptions,
        next_nonce: U256,
    ) -> Result<SafeTransactionData, Error> {
        let (to, value, data, operation) = match intents {
            [] => return Err(Error::EmptyIntentList),
            [single] => (
                single.to,
                single.value,
                single.data.clone(),
                single.operation,
            ),
            batch => {
                let payload = encode_multi_send(batch)?;
                debug!(
                    sub_calls = batch.len(),
                    payload_len = payload.len(),
                    batch_target = %self.batch_target,
                    "collapsing intents into multi-send delegate call"
                );
                let call = IMultiSend::multiSendCall {
                    transactions: payload.into(),
                };
                (
                    self.batch_target,
                    U256::ZERO,
                    Bytes::from(call.abi_encode()),
                    OperationType::DelegateCall,
                )
            }
        };

        Ok(SafeTransactionData {
            to,
            value,
            data,
            operation,
            safe_tx_gas: options.safe_tx_gas.unwrap_or(U256::ZERO),
            base_gas: options.base_gas.unwrap_or(U256::ZERO),
            gas_price: options.gas_price.unwrap_or(U256::ZERO),
            gas_token: options.gas_token.unwrap_or(Address::ZERO),
            refund_receiver: options.refund_receiver.unwrap_or(Address::ZERO),
            nonce: options.nonce.unwrap_or(next_nonce),
        })
    }

    /// Build, defaulting the nonce to the verifier's next sequential nonce
    /// read through the provider collaborator.
    pub async fn build_with_provider<P: RpcProvider>(
        &self,
        provider: &P,
        verifier: Address,
        intents: &[MetaTransactionData],
        options: &SafeTransactionOptions,
    ) -> Result<SafeTransactionData, Error> {
        let next_nonce = match options.nonce {
            Some(nonce) => nonce,
            None => provider.nonce_for(verifier).await?,
        };
        self.build(intents, options, next_nonce)
    }
}
