//! Signature collection and aggregation.
//!
//! Heterogeneous signature kinds are modeled as one tagged variant with a
//! uniform encode/decode contract, so aggregation stays a single pure
//! function over a closed set of cases. `merge` is commutative and
//! associative; the deterministic final order comes from `aggregate`, not
//! from collection order.

mod signer;

pub use signer::{address_of, recover_address, LocalSigner};

use std::collections::btree_map::{BTreeMap, Entry};

use alloy_primitives::{Address, B256, Bytes, U256};

use crate::errors::{DecodeError, Error};
use crate::utils::bytes::{read_b32, read_u256_be, read_vec};

/// How a signature was produced, and how the verifier will check it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureKind {
    /// 65-byte ECDSA over the raw transaction hash (v in {27, 28}).
    Ecdsa,
    /// 65-byte ECDSA over the EIP-191 wrapper of the hash (v in {31, 32}).
    EthSign,
    /// Delegated EIP-1271 signature produced by a contract account.
    ///
    /// The attestation is NOT verified locally; the verifier calls the
    /// account's `isValidSignature` at execution time. Treat it as
    /// unverified until then.
    Contract,
    /// On-chain pre-approval; the signature is a placeholder and the owner
    /// must have submitted `approveHash` separately.
    ApprovedHash,
}

/// One signer's signature over a transaction hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafeSignature {
    pub signer: Address,
    pub kind: SignatureKind,
    /// Ecdsa/EthSign: the 65-byte `r||s||v`. Contract: the dynamic
    /// attestation payload. ApprovedHash: empty.
    pub data: Bytes,
}

impl SafeSignature {
    /// The fixed 65-byte header the verifier reads for this entry.
    ///
    /// For contract signatures the `s` word is the offset of the dynamic
    /// payload inside the aggregated blob, supplied by the aggregator.
    pub fn static_part(&self, dynamic_offset: Option<usize>) -> Result<[u8; 65], DecodeError> {
        match self.kind {
            SignatureKind::Ecdsa | SignatureKind::EthSign => {
                if self.data.len() != 65 {
                    return Err(DecodeError::Truncated);
                }
                let mut out = [0u8; 65];
                out.copy_from_slice(&self.data);
                Ok(out)
            }
            SignatureKind::Contract => {
                let mut out = [0u8; 65];
                out[12..32].copy_from_slice(self.signer.as_slice());
                let offset = U256::from(dynamic_offset.unwrap_or(0));
                out[32..64].copy_from_slice(&offset.to_be_bytes::<32>());
                out[64] = 0;
                Ok(out)
            }
            SignatureKind::ApprovedHash => {
                let mut out = [0u8; 65];
                out[12..32].copy_from_slice(self.signer.as_slice());
                out[64] = 1;
                Ok(out)
            }
        }
    }

    /// The trailing dynamic payload, if this kind carries one.
    pub fn dynamic_part(&self) -> Option<&[u8]> {
        match self.kind {
            SignatureKind::Contract => Some(&self.data),
            _ => None,
        }
    }
}

/// A signing capability attached to an owner address.
#[derive(Clone, Debug)]
pub enum SignerIdentity {
    /// Local secp256k1 key.
    LocalKey {
        signer: LocalSigner,
        scheme: SigningScheme,
    },
    /// Smart-contract account producing an EIP-1271 attestation off-chain.
    Contract {
        address: Address,
        attestation: Bytes,
    },
    /// Externally-owned account that approves hashes on-chain instead of
    /// signing off-chain.
    ApprovedHash { owner: Address },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningScheme {
    Ecdsa,
    EthSign,
}

/// Produce a single signer's signature of the given hash.
///
/// For `ApprovedHash` identities the result is a zero-length placeholder;
/// submitting the on-chain `approveHash` transaction is the caller's side
/// effect, outside this function. For `Contract` identities the attestation
/// is passed through unverified (deferred to execution time).
pub fn sign(hash: B256, identity: &SignerIdentity) -> Result<SafeSignature, Error> {
    match identity {
        SignerIdentity::LocalKey { signer, scheme } => match scheme {
            SigningScheme::Ecdsa => signer.sign_hash(hash),
            SigningScheme::EthSign => signer.sign_hash_eth_sign(hash),
        },
        SignerIdentity::Contract {
            address,
            attestation,
        } => Ok(SafeSignature {
            signer: *address,
            kind: SignatureKind::Contract,
            data: attestation.clone(),
        }),
        SignerIdentity::ApprovedHash { owner } => Ok(SafeSignature {
            signer: *owner,
            kind: SignatureKind::ApprovedHash,
            data: Bytes::new(),
        }),
    }
}

/// Mapping from signer address to signature; keys unique, insertion order
/// irrelevant.
///
/// Backed by a `BTreeMap` keyed on the address bytes: byte order equals
/// case-insensitive lexicographic order on the lowercase hex form, which is
/// exactly the order the verifier requires for its O(n) owner sweep.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignatureSet {
    entries: BTreeMap<Address, SafeSignature>,
}

impl SignatureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, signer: &Address) -> Option<&SafeSignature> {
        self.entries.get(signer)
    }

    /// Signers in canonical (ascending) order.
    pub fn signers(&self) -> impl Iterator<Item = &Address> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SafeSignature> {
        self.entries.values()
    }

    /// Add a signature. Re-inserting identical bytes is a no-op; divergent
    /// bytes for the same signer are a conflict.
    pub fn insert(&mut self, signature: SafeSignature) -> Result<(), Error> {
        match self.entries.entry(signature.signer) {
            Entry::Vacant(slot) => {
                slot.insert(signature);
                Ok(())
            }
            Entry::Occupied(existing) => {
                if existing.get() == &signature {
                    Ok(())
                } else {
                    Err(Error::ConflictingSignature {
                        signer: signature.signer,
                    })
                }
            }
        }
    }

    /// Union by signer address. Commutative, associative, idempotent.
    pub fn merge(&self, other: &SignatureSet) -> Result<SignatureSet, Error> {
        let mut out = self.clone();
        for signature in other.entries.values() {
            out.insert(signature.clone())?;
        }
        Ok(out)
    }

    /// Canonical on-chain blob: 65-byte headers sorted by signer ascending,
    /// followed by the length-prefixed dynamic payloads of contract
    /// signatures, with each header's `s` word rewritten to the payload
    /// offset.
    ///
    /// No threshold check here: partial sets may be aggregated for
    /// inspection or storage.
    pub fn aggregate(&self) -> Result<Vec<u8>, Error> {
        let n = self.entries.len();
        let mut blob = Vec::with_capacity(65 * n);
        let mut dynamic = Vec::new();
        let mut dyn_cursor = 65 * n;

        for signature in self.entries.values() {
            let offset = match signature.kind {
                SignatureKind::Contract => Some(dyn_cursor),
                _ => None,
            };
            blob.extend_from_slice(&signature.static_part(offset)?);
            if let Some(payload) = signature.dynamic_part() {
                dynamic.extend_from_slice(&U256::from(payload.len()).to_be_bytes::<32>());
                dynamic.extend_from_slice(payload);
                dyn_cursor += 32 + payload.len();
            }
        }

        blob.extend_from_slice(&dynamic);
        Ok(blob)
    }

    /// Aggregate for submission: additionally enforces the threshold.
    pub fn aggregate_for_execution(&self, threshold: usize) -> Result<Vec<u8>, Error> {
        if self.entries.len() < threshold {
            return Err(Error::InsufficientSignatures {
                have: self.entries.len(),
                threshold,
            });
        }
        self.aggregate()
    }
}

impl FromIterator<SafeSignature> for SignatureSet {
    /// Collect signatures; later identical entries are deduplicated, later
    /// conflicting entries silently win. Prefer `insert`/`merge` when
    /// conflicts must be surfaced.
    fn from_iter<I: IntoIterator<Item = SafeSignature>>(iter: I) -> Self {
        let mut set = SignatureSet::new();
        for signature in iter {
            set.entries.insert(signature.signer, signature);
        }
        set
    }
}

/// One decoded 65-byte header from an aggregated blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
    /// Dynamic attestation payload, present for contract entries (v == 0).
    pub dynamic: Option<Vec<u8>>,
}

impl DecodedSignature {
    /// Signer claimed by the header's `r` word (contract and approved-hash
    /// entries; ECDSA kinds need recovery instead).
    pub fn header_signer(&self) -> Address {
        Address::from_slice(&self.r[12..])
    }
}

/// Parse an aggregated blob back into its entries.
///
/// The static region ends where the smallest dynamic offset begins (or at
/// the end of the blob when no contract entries exist).
pub fn decode_signatures(blob: &[u8]) -> Result<Vec<DecodedSignature>, DecodeError> {
    let mut static_end = blob.len();
    let mut headers: Vec<(B256, B256, u8)> = Vec::new();
    let mut pos = 0usize;

    while pos < static_end {
        if static_end < pos + 65 {
            return Err(DecodeError::Truncated);
        }
        let mut i = pos;
        let r = read_b32(blob, &mut i)?;
        let s = read_b32(blob, &mut i)?;
        let v = blob[i];
        if v == 0 {
            let offset = usize::try_from(U256::from_be_bytes(s.0))
                .map_err(|_| DecodeError::BadOffset(usize::MAX))?;
            if offset >= blob.len() {
                return Err(DecodeError::BadOffset(offset));
            }
            static_end = static_end.min(offset);
        }
        headers.push((r, s, v));
        pos += 65;
    }

    if pos != static_end {
        return Err(DecodeError::Truncated);
    }

    headers
        .into_iter()
        .map(|(r, s, v)| {
            let dynamic = if v == 0 {
                // Offset validity was checked above.
                let mut i = usize::try_from(U256::from_be_bytes(s.0)).unwrap_or(usize::MAX);
                if i < static_end {
                    return Err(DecodeError::BadOffset(i));
                }
                let len = usize::try_from(read_u256_be(blob, &mut i)?)
                    .map_err(|_| DecodeError::Truncated)?;
                Some(read_vec(blob, &mut i, len)?)
            } else {
                None
            };
            Ok(DecodedSignature { r, s, v, dynamic })
        })
        .collect()
}
