//! Execution planning: validate an aggregated signature blob against the
//! current owner set before assembling the final verifier call.
//!
//! The pre-check mirrors the verifier's own O(n) sweep, so a caller never
//! submits a doomed call: every failure here is raised before any network
//! side effect.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use tracing::debug;

use crate::contracts::ISafe;
use crate::errors::Error;
use crate::hashing::{eth_signed_message_hash, safe_tx_hash};
use crate::signatures::{decode_signatures, recover_address};
use crate::types::{SafeTransactionData, SafeVersion};

/// The final call to the verifier contract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionPlan {
    pub target: Address,
    pub data: Bytes,
    pub value: U256,
}

/// Validate signatures and assemble the `execTransaction` call.
///
/// Recovers each embedded ECDSA-kind signer, reads approved-hash and
/// contract signers from their header word, enforces strictly ascending
/// signer order (which also rejects duplicates), and requires every signer
/// to be a current owner with at least `threshold` entries total.
///
/// Contract (EIP-1271) entries are accepted on the signer's claim; their
/// attestations are verified by the contract account at execution time.
pub fn prepare(
    version: SafeVersion,
    chain_id: u64,
    verifier: Address,
    tx: &SafeTransactionData,
    signatures: &[u8],
    current_owners: &[Address],
    threshold: usize,
) -> Result<ExecutionPlan, Error> {
    let hash = safe_tx_hash(version, chain_id, verifier, tx);
    let entries = decode_signatures(signatures)?;

    let mut previous: Option<Address> = None;
    for entry in &entries {
        let signer = match entry.v {
            // Contract signature or on-chain approval: the header names the
            // signer directly.
            0 | 1 => entry.header_signer(),
            v if v > 30 => {
                let mut raw = [0u8; 65];
                raw[..32].copy_from_slice(entry.r.as_slice());
                raw[32..64].copy_from_slice(entry.s.as_slice());
                raw[64] = v - 4;
                recover_address(eth_signed_message_hash(hash), &raw)
                    .unwrap_or(Address::ZERO)
            }
            v => {
                let mut raw = [0u8; 65];
                raw[..32].copy_from_slice(entry.r.as_slice());
                raw[32..64].copy_from_slice(entry.s.as_slice());
                raw[64] = v;
                recover_address(hash, &raw).unwrap_or(Address::ZERO)
            }
        };

        // An unrecoverable signature yields the zero address, which is never
        // an owner; same outcome as the on-chain sweep.
        if !current_owners.contains(&signer) {
            return Err(Error::UnknownSigner { signer });
        }
        if let Some(prev) = previous {
            if signer <= prev {
                return Err(Error::ConflictingSignature { signer });
            }
        }
        previous = Some(signer);
    }

    if entries.len() < threshold {
        return Err(Error::ThresholdNotMet {
            hash,
            valid: entries.len(),
            threshold,
        });
    }

    debug!(
        %hash,
        signers = entries.len(),
        threshold,
        verifier = %verifier,
        "execution plan validated"
    );

    let call = ISafe::execTransactionCall {
        to: tx.to,
        value: tx.value,
        data: tx.data.clone(),
        operation: tx.operation.as_u8(),
        safeTxGas: tx.safe_tx_gas,
        baseGas: tx.base_gas,
        gasPrice: tx.gas_price,
        gasToken: tx.gas_token,
        refundReceiver: tx.refund_receiver,
        signatures: Bytes::from(signatures.to_vec()),
    };

    Ok(ExecutionPlan {
        target: verifier,
        data: Bytes::from(call.abi_encode()),
        value: U256::ZERO,
    })
}

/// Intrinsic cost of any transaction.
const BASE_TX_GAS: u64 = 21_000;
/// Calldata costs per EVM rules.
const GAS_PER_ZERO_BYTE: u64 = 4;
const GAS_PER_NONZERO_BYTE: u64 = 16;
/// Headroom per signature for recovery and the owner sweep.
const GAS_PER_SIGNATURE: u64 = 8_000;
/// Fixed overhead of the verifier's execution path (hashing, storage reads,
/// nonce bump).
const EXEC_OVERHEAD_GAS: u64 = 20_000;

fn data_gas(data: &[u8]) -> u64 {
    data.iter()
        .map(|b| {
            if *b == 0 {
                GAS_PER_ZERO_BYTE
            } else {
                GAS_PER_NONZERO_BYTE
            }
        })
        .sum()
}

/// Advisory estimate of `baseGas`: everything the verifier spends outside
/// the inner call. Final accounting happens on-chain.
pub fn estimate_base_gas(tx: &SafeTransactionData, threshold: usize) -> U256 {
    U256::from(
        BASE_TX_GAS
            + data_gas(&tx.data)
            + threshold as u64 * GAS_PER_SIGNATURE
            + EXEC_OVERHEAD_GAS,
    )
}

/// Advisory estimate of `safeTxGas` for the inner call itself.
pub fn estimate_safe_tx_gas(tx: &SafeTransactionData) -> U256 {
    U256::from(data_gas(&tx.data) + EXEC_OVERHEAD_GAS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signatures::{
        sign, LocalSigner, SignatureSet, SignerIdentity,
    };
    use crate::types::OperationType;
    use alloy_primitives::address;

    // Hardhat accounts 0..2.
    const KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_1: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
    const KEY_2: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

    const VERIFIER: Address = address!("00000000000000000000000000000000000000fe");
    const CHAIN_ID: u64 = 31337;
    const VERSION: SafeVersion = SafeVersion::V1_4_1;

    fn local(hex_key: &str) -> LocalSigner {
        LocalSigner::from_bytes(&hex::decode(hex_key).unwrap()).unwrap()
    }

    fn sample_tx() -> SafeTransactionData {
        SafeTransactionData {
            to: address!("0000000000000000000000000000000000000001"),
            value: U256::from(100u64),
            data: Bytes::from(vec![0x00, 0x01, 0x02]),
            operation: OperationType::Call,
            safe_tx_gas: U256::ZERO,
            base_gas: U256::ZERO,
            gas_price: U256::ZERO,
            gas_token: Address::ZERO,
            refund_receiver: Address::ZERO,
            nonce: U256::ZERO,
        }
    }

    fn signed_blob(keys: &[&str]) -> Vec<u8> {
        let hash = safe_tx_hash(VERSION, CHAIN_ID, VERIFIER, &sample_tx());
        let mut set = SignatureSet::new();
        for key in keys {
            set.insert(local(key).sign_hash(hash).unwrap()).unwrap();
        }
        set.aggregate().unwrap()
    }

    fn owners() -> Vec<Address> {
        vec![
            local(KEY_0).address(),
            local(KEY_1).address(),
            local(KEY_2).address(),
        ]
    }

    #[test]
    fn threshold_met_yields_plan() {
        let blob = signed_blob(&[KEY_0, KEY_1]);
        let plan = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &blob,
            &owners(),
            2,
        )
        .unwrap();

        assert_eq!(plan.target, VERIFIER);
        assert_eq!(plan.value, U256::ZERO);
        assert_eq!(&plan.data[..4], ISafe::execTransactionCall::SELECTOR);

        // The embedded signatures survive encoding.
        let call = ISafe::execTransactionCall::abi_decode(&plan.data, true).unwrap();
        assert_eq!(call.signatures.as_ref(), blob.as_slice());
    }

    #[test]
    fn one_signature_short_fails_threshold() {
        let blob = signed_blob(&[KEY_0]);
        let err = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &blob,
            &owners(),
            2,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::ThresholdNotMet {
                valid: 1,
                threshold: 2,
                ..
            }
        ));
    }

    #[test]
    fn non_owner_signer_rejected_even_when_threshold_met() {
        // KEY_2 signs but is excluded from the owner set.
        let blob = signed_blob(&[KEY_0, KEY_1, KEY_2]);
        let owners = vec![local(KEY_0).address(), local(KEY_1).address()];

        let err = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &blob,
            &owners,
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSigner { signer }
            if signer == local(KEY_2).address()));
    }

    #[test]
    fn duplicate_header_rejected() {
        let blob = signed_blob(&[KEY_0]);
        let mut doubled = blob.clone();
        doubled.extend_from_slice(&blob);

        let err = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &doubled,
            &owners(),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::ConflictingSignature { .. }));
    }

    #[test]
    fn approved_hash_and_eth_sign_entries_count() {
        let hash = safe_tx_hash(VERSION, CHAIN_ID, VERIFIER, &sample_tx());
        let approver = local(KEY_2).address();

        let mut set = SignatureSet::new();
        set.insert(local(KEY_0).sign_hash_eth_sign(hash).unwrap())
            .unwrap();
        set.insert(sign(hash, &SignerIdentity::ApprovedHash { owner: approver }).unwrap())
            .unwrap();
        let blob = set.aggregate().unwrap();

        let plan = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &blob,
            &owners(),
            2,
        );
        assert!(plan.is_ok());
    }

    #[test]
    fn tampered_signature_recovers_to_non_owner() {
        let mut blob = signed_blob(&[KEY_0, KEY_1]);
        // Flip a byte inside the first signature's r word.
        blob[5] ^= 0xff;
        let err = prepare(
            VERSION,
            CHAIN_ID,
            VERIFIER,
            &sample_tx(),
            &blob,
            &owners(),
            2,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSigner { .. }));
    }

    #[test]
    fn gas_estimates_are_pure_and_monotonic() {
        let tx = sample_tx();
        assert_eq!(estimate_base_gas(&tx, 2), estimate_base_gas(&tx, 2));
        assert!(estimate_base_gas(&tx, 3) > estimate_base_gas(&tx, 2));

        let mut bigger = tx.clone();
        bigger.data = Bytes::from(vec![0xffu8; 100]);
        assert!(estimate_safe_tx_gas(&bigger) > estimate_safe_tx_gas(&tx));

        // Zero bytes cost less than non-zero bytes.
        let mut zeros = tx.clone();
        zeros.data = Bytes::from(vec![0u8; 100]);
        let mut ones = tx;
        ones.data = Bytes::from(vec![1u8; 100]);
        assert!(estimate_safe_tx_gas(&zeros) < estimate_safe_tx_gas(&ones));
    }
}
