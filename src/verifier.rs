//! Typed reads and approvals against a deployed verifier contract.
//!
//! Thin glue between the ABI surfaces in [`crate::contracts`] and the
//! [`RpcProvider`] collaborator. Return data the provider hands back is
//! decoded here; a malformed word is reported as a provider failure.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::contracts::{ISafe, EIP1271_MAGIC_VALUE};
use crate::errors::{Error, ProviderError};
use crate::provider::RpcProvider;

/// Handle on one verifier instance, borrowed over a provider.
pub struct VerifierReader<'a, P> {
    provider: &'a P,
    address: Address,
}

impl<'a, P: RpcProvider> VerifierReader<'a, P> {
    pub fn new(provider: &'a P, address: Address) -> Self {
        Self { provider, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall>(&self, call: C) -> Result<C::Return, Error> {
        let out = self
            .provider
            .call(self.address, Bytes::from(call.abi_encode()))
            .await?;
        C::abi_decode_returns(&out, true)
            .map_err(|e| ProviderError::new(format!("malformed return data: {e}")).into())
    }

    /// Next sequential nonce. Monotonic per instance, starts at 0, consumed
    /// even by failed on-chain executions, never reused.
    pub async fn nonce(&self) -> Result<U256, Error> {
        Ok(self.read(ISafe::nonceCall {}).await?.nonce)
    }

    pub async fn threshold(&self) -> Result<U256, Error> {
        Ok(self.read(ISafe::getThresholdCall {}).await?.threshold)
    }

    pub async fn owners(&self) -> Result<Vec<Address>, Error> {
        Ok(self.read(ISafe::getOwnersCall {}).await?.owners)
    }

    /// EIP-1271 check: does this verifier accept `signature` over `hash`?
    pub async fn is_valid_signature(&self, hash: B256, signature: Bytes) -> Result<bool, Error> {
        let magic = self
            .read(ISafe::isValidSignatureCall { hash, signature })
            .await?
            .magicValue;
        Ok(magic.as_slice() == EIP1271_MAGIC_VALUE)
    }

    /// Whether `owner` has an on-chain approval recorded for `hash`.
    pub async fn is_hash_approved(&self, owner: Address, hash: B256) -> Result<bool, Error> {
        let approved = self
            .read(ISafe::approvedHashesCall { owner, hash })
            .await?
            .approved;
        Ok(approved != U256::ZERO)
    }

    /// Submit the on-chain `approveHash` transaction for an approved-hash
    /// signer. Side effect; returns the submitted transaction's hash.
    pub async fn approve_hash(&self, hash: B256) -> Result<B256, Error> {
        let data = ISafe::approveHashCall {
            hashToApprove: hash,
        }
        .abi_encode();
        debug!(verifier = %self.address, %hash, "submitting approveHash");
        Ok(self
            .provider
            .send_transaction(self.address, Bytes::from(data), U256::ZERO)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, keccak256};
    use alloy_sol_types::SolValue;
    use std::collections::HashMap;

    /// Canned provider keyed by call selector.
    #[derive(Default)]
    struct MockProvider {
        returns: HashMap<[u8; 4], Vec<u8>>,
    }

    impl MockProvider {
        fn with_return(mut self, selector: [u8; 4], data: Vec<u8>) -> Self {
            self.returns.insert(selector, data);
            self
        }
    }

    impl RpcProvider for MockProvider {
        async fn chain_id(&self) -> Result<u64, ProviderError> {
            Ok(31337)
        }

        async fn nonce_for(&self, _verifier: Address) -> Result<U256, ProviderError> {
            Ok(U256::ZERO)
        }

        async fn call(&self, _target: Address, data: Bytes) -> Result<Bytes, ProviderError> {
            let mut selector = [0u8; 4];
            selector.copy_from_slice(&data[..4]);
            self.returns
                .get(&selector)
                .cloned()
                .map(Bytes::from)
                .ok_or_else(|| ProviderError::new("unexpected call"))
        }

        async fn send_transaction(
            &self,
            target: Address,
            data: Bytes,
            _value: U256,
        ) -> Result<B256, ProviderError> {
            // Echo a deterministic pseudo tx hash for assertions.
            let mut buf = target.to_vec();
            buf.extend_from_slice(&data);
            Ok(keccak256(&buf))
        }
    }

    const VERIFIER: Address = address!("00000000000000000000000000000000000000fe");

    #[tokio::test]
    async fn decodes_nonce_threshold_owners() {
        let owners = vec![
            address!("00000000000000000000000000000000000000a1"),
            address!("00000000000000000000000000000000000000a2"),
        ];
        let provider = MockProvider::default()
            .with_return(ISafe::nonceCall::SELECTOR, U256::from(7u64).abi_encode())
            .with_return(
                ISafe::getThresholdCall::SELECTOR,
                U256::from(2u64).abi_encode(),
            )
            .with_return(ISafe::getOwnersCall::SELECTOR, owners.abi_encode());

        let reader = VerifierReader::new(&provider, VERIFIER);
        assert_eq!(reader.nonce().await.unwrap(), U256::from(7u64));
        assert_eq!(reader.threshold().await.unwrap(), U256::from(2u64));
        assert_eq!(reader.owners().await.unwrap(), owners);
    }

    #[tokio::test]
    async fn eip1271_magic_value_compare() {
        let valid = MockProvider::default().with_return(
            ISafe::isValidSignatureCall::SELECTOR,
            alloy_primitives::FixedBytes::<4>::from(EIP1271_MAGIC_VALUE).abi_encode(),
        );
        let reader = VerifierReader::new(&valid, VERIFIER);
        assert!(reader
            .is_valid_signature(keccak256("m"), Bytes::new())
            .await
            .unwrap());

        let invalid = MockProvider::default().with_return(
            ISafe::isValidSignatureCall::SELECTOR,
            alloy_primitives::FixedBytes::<4>::from([0u8; 4]).abi_encode(),
        );
        let reader = VerifierReader::new(&invalid, VERIFIER);
        assert!(!reader
            .is_valid_signature(keccak256("m"), Bytes::new())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn provider_failures_pass_through() {
        let provider = MockProvider::default();
        let reader = VerifierReader::new(&provider, VERIFIER);
        let err = reader.nonce().await.unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn approve_hash_submits_transaction() {
        let provider = MockProvider::default();
        let reader = VerifierReader::new(&provider, VERIFIER);
        let tx_hash = reader.approve_hash(keccak256("approve me")).await.unwrap();
        assert_ne!(tx_hash, B256::ZERO);
    }
}
