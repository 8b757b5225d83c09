//! RPC/provider collaborator boundary.
//!
//! The core treats every provider operation as a cancellable, asynchronous
//! call returning a plain value or a [`ProviderError`]; no retries happen
//! here.

use alloy_primitives::{Address, Bytes, B256, U256};

use crate::errors::ProviderError;

/// Chain access required by the kit.
///
/// Implementations wrap a node connection (or a fixture in tests); the core
/// never opens connections itself.
pub trait RpcProvider {
    fn chain_id(&self) -> impl std::future::Future<Output = Result<u64, ProviderError>> + Send;

    /// Next sequential nonce of a verifier instance.
    fn nonce_for(
        &self,
        verifier: Address,
    ) -> impl std::future::Future<Output = Result<U256, ProviderError>> + Send;

    /// `eth_call`-style read.
    fn call(
        &self,
        target: Address,
        data: Bytes,
    ) -> impl std::future::Future<Output = Result<Bytes, ProviderError>> + Send;

    /// Submit a transaction, returning its hash.
    fn send_transaction(
        &self,
        target: Address,
        data: Bytes,
        value: U256,
    ) -> impl std::future::Future<Output = Result<B256, ProviderError>> + Send;
}
