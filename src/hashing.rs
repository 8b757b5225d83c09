//! Typed-data hashing for verifier transactions and arbitrary messages.
//!
//! Produces the 32-byte hash every signer must independently reproduce:
//! a domain separator over `{chainId, verifyingContract}` (chainId omitted
//! for versions that predate chain-bound domains), a struct hash over the
//! transaction fields in their declared order, combined as
//! `keccak256(0x1901 || domainSeparator || structHash)`.
//!
//! Field order is dictated solely by the version's declared schema; no
//! caller-supplied ordering ever reaches these functions.

use alloy_primitives::{b256, keccak256, Address, B256, U256};

use crate::types::{SafeTransactionData, SafeVersion};

/// keccak256("EIP712Domain(uint256 chainId,address verifyingContract)")
pub const DOMAIN_TYPEHASH: B256 =
    b256!("47e79534a245952e8b16893a336b85a3d9ea9fa8c573f3d803afb92a79469218");

/// keccak256("EIP712Domain(address verifyingContract)")
///
/// Used by versions before 1.3.0, which predate chain-bound domains.
pub const DOMAIN_TYPEHASH_LEGACY: B256 =
    b256!("035aff83d86937d35b32e04f0ddc6ff469290eef2f1b692d8a815c89404d4749");

/// keccak256("SafeTx(address to,uint256 value,bytes data,uint8 operation,
/// uint256 safeTxGas,uint256 baseGas,uint256 gasPrice,address gasToken,
/// address refundReceiver,uint256 nonce)")
pub const SAFE_TX_TYPEHASH: B256 =
    b256!("bb8310d486368db6bd6f849402fdd73ad53d316b5a4b2644ad6efe0f941286d8");

/// keccak256("SafeMessage(bytes message)")
pub const SAFE_MSG_TYPEHASH: B256 =
    b256!("60b3cbf8b4a223d68d641b3b6ddf9a298e7f33710cf3d3a9d1146b5a6150fbca");

fn word_address(addr: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..32].copy_from_slice(addr.as_slice());
    padded
}

/// Domain separator binding the hash to a verifier instance (and, for
/// chain-bound versions, to a chain).
pub fn domain_separator(version: SafeVersion, chain_id: u64, verifier: Address) -> B256 {
    let mut buf = Vec::with_capacity(32 * 3);
    if version.is_chain_bound() {
        buf.extend_from_slice(DOMAIN_TYPEHASH.as_slice());
        buf.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    } else {
        buf.extend_from_slice(DOMAIN_TYPEHASH_LEGACY.as_slice());
    }
    buf.extend_from_slice(&word_address(verifier));
    keccak256(&buf)
}

/// Struct hash over the transaction fields in their declared order.
pub fn safe_tx_struct_hash(tx: &SafeTransactionData) -> B256 {
    let mut buf = Vec::with_capacity(32 * 11);
    buf.extend_from_slice(SAFE_TX_TYPEHASH.as_slice());
    buf.extend_from_slice(&word_address(tx.to));
    buf.extend_from_slice(&tx.value.to_be_bytes::<32>());
    buf.extend_from_slice(keccak256(&tx.data).as_slice());
    buf.extend_from_slice(&U256::from(tx.operation.as_u8()).to_be_bytes::<32>());
    buf.extend_from_slice(&tx.safe_tx_gas.to_be_bytes::<32>());
    buf.extend_from_slice(&tx.base_gas.to_be_bytes::<32>());
    buf.extend_from_slice(&tx.gas_price.to_be_bytes::<32>());
    buf.extend_from_slice(&word_address(tx.gas_token));
    buf.extend_from_slice(&word_address(tx.refund_receiver));
    buf.extend_from_slice(&tx.nonce.to_be_bytes::<32>());
    keccak256(&buf)
}

fn combine(domain: B256, struct_hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(2 + 32 + 32);
    buf.extend_from_slice(b"\x19\x01");
    buf.extend_from_slice(domain.as_slice());
    buf.extend_from_slice(struct_hash.as_slice());
    keccak256(&buf)
}

/// The transaction hash signed by every owner.
pub fn safe_tx_hash(
    version: SafeVersion,
    chain_id: u64,
    verifier: Address,
    tx: &SafeTransactionData,
) -> B256 {
    combine(
        domain_separator(version, chain_id, verifier),
        safe_tx_struct_hash(tx),
    )
}

/// Struct hash for an arbitrary opaque message (off-chain sign-message flow).
pub fn safe_message_struct_hash(message: &[u8]) -> B256 {
    let mut buf = Vec::with_capacity(32 * 2);
    buf.extend_from_slice(SAFE_MSG_TYPEHASH.as_slice());
    buf.extend_from_slice(keccak256(message).as_slice());
    keccak256(&buf)
}

/// Typed-data hash of an arbitrary message, bound to a verifier instance.
pub fn safe_message_hash(
    version: SafeVersion,
    chain_id: u64,
    verifier: Address,
    message: &[u8],
) -> B256 {
    combine(
        domain_separator(version, chain_id, verifier),
        safe_message_struct_hash(message),
    )
}

/// EIP-191 `eth_sign` wrapper over a 32-byte hash.
///
/// Used when a signer's key infrastructure cannot sign raw digests.
pub fn eth_signed_message_hash(hash: B256) -> B256 {
    let mut buf = Vec::with_capacity(28 + 32);
    buf.extend_from_slice(b"\x19Ethereum Signed Message:\n32");
    buf.extend_from_slice(hash.as_slice());
    keccak256(&buf)
}
