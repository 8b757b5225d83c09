//! Minimal big-endian parsing helpers.
//!
//! Used for decoding the packed multi-send payload and the aggregated
//! signature blob's 65-byte headers.

use alloy_primitives::{Address, B256, U256};

use crate::errors::DecodeError;

pub fn read_u8(bytes: &[u8], i: &mut usize) -> Result<u8, DecodeError> {
    if bytes.len() <= *i {
        return Err(DecodeError::Truncated);
    }
    let b = bytes[*i];
    *i += 1;
    Ok(b)
}

// Length words come straight off the wire, so `*i + len` must not be
// allowed to wrap.
fn checked_end(i: usize, len: usize, total: usize) -> Result<usize, DecodeError> {
    match i.checked_add(len) {
        Some(end) if end <= total => Ok(end),
        _ => Err(DecodeError::Truncated),
    }
}

pub fn read_vec(bytes: &[u8], i: &mut usize, len: usize) -> Result<Vec<u8>, DecodeError> {
    let end = checked_end(*i, len, bytes.len())?;
    let out = bytes[*i..end].to_vec();
    *i = end;
    Ok(out)
}

pub fn read_u256_be(bytes: &[u8], i: &mut usize) -> Result<U256, DecodeError> {
    let end = checked_end(*i, 32, bytes.len())?;
    let out = U256::from_be_slice(&bytes[*i..end]);
    *i = end;
    Ok(out)
}

pub fn read_b32(bytes: &[u8], i: &mut usize) -> Result<B256, DecodeError> {
    let end = checked_end(*i, 32, bytes.len())?;
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&bytes[*i..end]);
    *i = end;
    Ok(B256::from(buf))
}

pub fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, DecodeError> {
    let end = checked_end(*i, 20, bytes.len())?;
    let addr = Address::from_slice(&bytes[*i..end]);
    *i = end;
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_reads_fail() {
        let buf = [0u8; 10];
        let mut i = 0usize;
        assert_eq!(read_u256_be(&buf, &mut i), Err(DecodeError::Truncated));
        assert_eq!(read_address(&buf[..4], &mut i), Err(DecodeError::Truncated));
    }

    #[test]
    fn oversized_length_does_not_wrap() {
        let buf = [0u8; 64];
        let mut i = 32usize;
        assert_eq!(
            read_vec(&buf, &mut i, usize::MAX - 10),
            Err(DecodeError::Truncated)
        );
        assert_eq!(i, 32);
    }

    #[test]
    fn cursor_advances() {
        let mut buf = vec![0u8; 53];
        buf[0] = 1;
        buf[52] = 7;
        let mut i = 0usize;
        assert_eq!(read_u8(&buf, &mut i).unwrap(), 1);
        let _ = read_address(&buf, &mut i).unwrap();
        let word = read_u256_be(&buf, &mut i).unwrap();
        assert_eq!(word, U256::from(7u64));
        assert_eq!(i, 53);
    }
}
