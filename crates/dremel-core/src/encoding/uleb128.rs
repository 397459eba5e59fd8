//! Unsigned LEB128 varints, used for run headers of the hybrid level encoding.

use crate::{ParquetError, Result};
use bytes::BufMut;

/// Append `value` as ULEB128 to `buf`.
pub fn encode_uleb128<B: BufMut>(mut value: u64, buf: &mut B) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.put_u8(byte);
            return;
        }
        buf.put_u8(byte | 0x80);
    }
}

/// Decode a ULEB128 value from the start of `buf`.
///
/// Returns the value and the number of bytes read.
pub fn decode_uleb128(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    let mut shift = 0;

    for (i, &byte) in buf.iter().enumerate() {
        if shift >= 64 {
            return Err(ParquetError::corrupt("ULEB128 value is too large"));
        }
        value |= u64::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    Err(ParquetError::corrupt("truncated ULEB128 sequence"))
}
