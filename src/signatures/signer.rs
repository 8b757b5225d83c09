//! Local-key ECDSA signing and address recovery.
//!
//! A produced signature is always self-checked: the signer address is
//! recovered from the fresh signature and compared against the key's own
//! address before the signature is returned.

use alloy_primitives::{keccak256, Address, B256, Bytes};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

use crate::errors::Error;
use crate::hashing::eth_signed_message_hash;
use crate::signatures::{SafeSignature, SignatureKind};

/// Ethereum address of a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let uncompressed = key.to_encoded_point(false);
    // Skip the 0x04 prefix; address is the low 20 bytes of the hash.
    let hash = keccak256(&uncompressed.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Recover an EOA address from a 32-byte digest and a 65-byte `r||s||v`
/// signature. Accepts v in {0, 1, 27, 28}.
pub fn recover_address(digest: B256, sig: &[u8]) -> Option<Address> {
    if sig.len() != 65 {
        return None;
    }
    let recid_byte = match sig[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        _ => return None,
    };
    let recid = RecoveryId::from_byte(recid_byte)?;
    let signature = Signature::from_slice(&sig[..64]).ok()?;
    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &signature, recid).ok()?;
    Some(address_of(&key))
}

/// A signer holding a local secp256k1 key.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
    address: Address,
}

impl core::fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print key material.
        f.debug_struct("LocalSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl LocalSigner {
    pub fn new(key: SigningKey) -> Self {
        let address = address_of(key.verifying_key());
        Self { key, address }
    }

    /// Parse a 32-byte private key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, k256::ecdsa::Error> {
        Ok(Self::new(SigningKey::from_slice(bytes)?))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    fn sign_digest(&self, digest: B256, kind: SignatureKind) -> Result<SafeSignature, Error> {
        let (signature, recid) = self
            .key
            .sign_prehash_recoverable(digest.as_slice())
            .map_err(|_| Error::SignatureMismatch {
                hash: digest,
                expected: self.address,
                recovered: Address::ZERO,
            })?;

        let v_base = 27 + recid.to_byte();
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(signature.to_bytes().as_slice());
        // EthSign signatures carry v + 4 so the verifier knows to recover
        // against the prefixed digest.
        bytes.push(match kind {
            SignatureKind::EthSign => v_base + 4,
            _ => v_base,
        });

        // Self-check before handing the signature out.
        let mut check = bytes.clone();
        check[64] = v_base;
        let recovered = recover_address(digest, &check).unwrap_or(Address::ZERO);
        if recovered != self.address {
            return Err(Error::SignatureMismatch {
                hash: digest,
                expected: self.address,
                recovered,
            });
        }

        Ok(SafeSignature {
            signer: self.address,
            kind,
            data: Bytes::from(bytes),
        })
    }

    /// Sign a raw 32-byte hash.
    pub fn sign_hash(&self, hash: B256) -> Result<SafeSignature, Error> {
        self.sign_digest(hash, SignatureKind::Ecdsa)
    }

    /// Sign the EIP-191 `eth_sign` wrapper of a hash, for key infrastructure
    /// that refuses raw digests.
    pub fn sign_hash_eth_sign(&self, hash: B256) -> Result<SafeSignature, Error> {
        self.sign_digest(eth_signed_message_hash(hash), SignatureKind::EthSign)
    }
}
