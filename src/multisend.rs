//! Packed codec for the batching helper's payload.
//!
//! Each sub-call is encoded as
//! `operation(1 byte) || to(20 bytes) || value(32 bytes) || dataLength(32 bytes) || data`
//! and the tuples are concatenated. The batching helper is invoked via
//! DelegateCall, so sub-call operations are fixed at Call: a batched
//! DelegateCall would let a sub-call redefine storage of the aggregate.

use alloy_primitives::{Bytes, U256};

use crate::errors::{DecodeError, Error};
use crate::types::{MetaTransactionData, OperationType};
use crate::utils::bytes::{read_address, read_u8, read_u256_be, read_vec};

/// Encode sub-calls into the packed multi-send payload.
pub fn encode_multi_send(calls: &[MetaTransactionData]) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    for call in calls {
        if call.operation == OperationType::DelegateCall {
            return Err(Error::UnsupportedNestedDelegateCall { to: call.to });
        }
        buf.push(OperationType::Call.as_u8());
        buf.extend_from_slice(call.to.as_slice());
        buf.extend_from_slice(&call.value.to_be_bytes::<32>());
        buf.extend_from_slice(&U256::from(call.data.len()).to_be_bytes::<32>());
        buf.extend_from_slice(&call.data);
    }
    Ok(buf)
}

/// Decode a packed multi-send payload back into its sub-calls.
pub fn decode_multi_send(payload: &[u8]) -> Result<Vec<MetaTransactionData>, DecodeError> {
    let mut calls = Vec::new();
    let mut i = 0usize;
    while i < payload.len() {
        let operation = OperationType::try_from(read_u8(payload, &mut i)?)?;
        let to = read_address(payload, &mut i)?;
        let value = read_u256_be(payload, &mut i)?;
        let data_len = read_u256_be(payload, &mut i)?;
        let data_len = usize::try_from(data_len).map_err(|_| DecodeError::Truncated)?;
        let data = read_vec(payload, &mut i, data_len)?;
        calls.push(MetaTransactionData {
            to,
            value,
            data: Bytes::from(data),
            operation,
        });
    }
    Ok(calls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, Address};

    fn call(to: Address, value: u64, data: Vec<u8>) -> MetaTransactionData {
        MetaTransactionData {
            to,
            value: U256::from(value),
            data: Bytes::from(data),
            operation: OperationType::Call,
        }
    }

    #[test]
    fn round_trips_two_sub_calls_in_order() {
        let calls = vec![
            call(
                address!("0000000000000000000000000000000000000001"),
                0,
                vec![0xaa],
            ),
            call(
                address!("0000000000000000000000000000000000000002"),
                5,
                vec![0xbb],
            ),
        ];

        let payload = encode_multi_send(&calls).unwrap();
        // op(1) + to(20) + value(32) + len(32) + 1 byte of data, per call.
        assert_eq!(payload.len(), 2 * (1 + 20 + 32 + 32 + 1));

        let decoded = decode_multi_send(&payload).unwrap();
        assert_eq!(decoded, calls);
    }

    #[test]
    fn rejects_nested_delegate_call() {
        let mut bad = call(
            address!("0000000000000000000000000000000000000003"),
            0,
            vec![],
        );
        bad.operation = OperationType::DelegateCall;

        let err = encode_multi_send(&[bad]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedNestedDelegateCall { to }
            if to == address!("0000000000000000000000000000000000000003")));
    }

    #[test]
    fn truncated_payload_rejected() {
        let calls = vec![call(
            address!("0000000000000000000000000000000000000001"),
            0,
            vec![0xaa, 0xbb, 0xcc],
        )];
        let mut payload = encode_multi_send(&calls).unwrap();
        payload.truncate(payload.len() - 2);
        assert_eq!(decode_multi_send(&payload), Err(DecodeError::Truncated));
    }

    #[test]
    fn empty_payload_decodes_to_no_calls() {
        assert!(decode_multi_send(&[]).unwrap().is_empty());
    }
}
