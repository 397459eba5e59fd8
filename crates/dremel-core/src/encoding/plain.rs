//! PLAIN value encoding.
//!
//! Numbers are little endian at their physical width, unsigned types share
//! the bits of their signed counterparts, booleans are bit-packed LSB first
//! and strings are a 4-byte little endian length followed by UTF-8 bytes.

use crate::{ParquetError, ParquetValue, PrimitiveType, Result};
use bytes::{Buf, BufMut};
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Append `values` to `out`; every value must match `primitive_type`
pub fn encode_plain<B: BufMut>(
    primitive_type: PrimitiveType,
    values: &[ParquetValue],
    out: &mut B,
) -> Result<()> {
    if primitive_type == PrimitiveType::Boolean {
        let mut byte = 0u8;
        for (i, value) in values.iter().enumerate() {
            let ParquetValue::Boolean(b) = value else {
                return Err(mismatch(primitive_type, value));
            };
            if *b {
                byte |= 1 << (i % 8);
            }
            if i % 8 == 7 {
                out.put_u8(byte);
                byte = 0;
            }
        }
        if values.len() % 8 != 0 {
            out.put_u8(byte);
        }
        return Ok(());
    }

    for value in values {
        encode_one(primitive_type, value, out)?;
    }
    Ok(())
}

/// PLAIN bytes of a single non-boolean value, or one byte for a boolean
pub fn encode_one<B: BufMut>(
    primitive_type: PrimitiveType,
    value: &ParquetValue,
    out: &mut B,
) -> Result<()> {
    match (primitive_type, value) {
        (PrimitiveType::Int32, ParquetValue::Int32(v)) => out.put_i32_le(*v),
        (PrimitiveType::UInt32, ParquetValue::UInt32(v)) => out.put_u32_le(*v),
        (PrimitiveType::Int64, ParquetValue::Int64(v)) => out.put_i64_le(*v),
        (PrimitiveType::UInt64, ParquetValue::UInt64(v)) => out.put_u64_le(*v),
        (PrimitiveType::Float32, ParquetValue::Float32(v)) => out.put_f32_le(v.0),
        (PrimitiveType::Float64, ParquetValue::Float64(v)) => out.put_f64_le(v.0),
        (PrimitiveType::Boolean, ParquetValue::Boolean(v)) => out.put_u8(*v as u8),
        (PrimitiveType::String, ParquetValue::String(s)) => {
            out.put_u32_le(s.len() as u32);
            out.put_slice(s.as_bytes());
        }
        _ => return Err(mismatch(primitive_type, value)),
    }
    Ok(())
}

fn mismatch(primitive_type: PrimitiveType, value: &ParquetValue) -> ParquetError {
    ParquetError::data_validation(format!(
        "cannot encode {} as {}",
        value.type_name(),
        primitive_type.type_name()
    ))
}

/// Decode `num_values` values from the start of `data`
pub fn decode_plain(
    primitive_type: PrimitiveType,
    mut data: &[u8],
    num_values: usize,
) -> Result<Vec<ParquetValue>> {
    if primitive_type == PrimitiveType::Boolean {
        let needed = num_values.div_ceil(8);
        if data.len() < needed {
            return Err(truncated(primitive_type));
        }
        return Ok((0..num_values)
            .map(|i| ParquetValue::Boolean((data[i / 8] >> (i % 8)) & 1 == 1))
            .collect());
    }

    // non-boolean values take at least four bytes each
    let mut values = Vec::with_capacity(num_values.min(data.len() / 4));
    for _ in 0..num_values {
        values.push(decode_one(primitive_type, &mut data)?);
    }
    Ok(values)
}

/// Decode one non-boolean value, or a single-byte boolean, advancing `data`
pub fn decode_one(primitive_type: PrimitiveType, data: &mut &[u8]) -> Result<ParquetValue> {
    let width = match primitive_type {
        PrimitiveType::Boolean => 1,
        PrimitiveType::Int32 | PrimitiveType::UInt32 | PrimitiveType::Float32 => 4,
        PrimitiveType::Int64 | PrimitiveType::UInt64 | PrimitiveType::Float64 => 8,
        PrimitiveType::String => 4,
    };
    if data.remaining() < width {
        return Err(truncated(primitive_type));
    }

    Ok(match primitive_type {
        PrimitiveType::Int32 => ParquetValue::Int32(data.get_i32_le()),
        PrimitiveType::UInt32 => ParquetValue::UInt32(data.get_u32_le()),
        PrimitiveType::Int64 => ParquetValue::Int64(data.get_i64_le()),
        PrimitiveType::UInt64 => ParquetValue::UInt64(data.get_u64_le()),
        PrimitiveType::Float32 => ParquetValue::Float32(OrderedFloat(data.get_f32_le())),
        PrimitiveType::Float64 => ParquetValue::Float64(OrderedFloat(data.get_f64_le())),
        PrimitiveType::Boolean => ParquetValue::Boolean(data.get_u8() != 0),
        PrimitiveType::String => {
            let len = data.get_u32_le() as usize;
            if data.remaining() < len {
                return Err(truncated(primitive_type));
            }
            let s = std::str::from_utf8(&data[..len])?;
            let value = ParquetValue::String(Arc::from(s));
            data.advance(len);
            value
        }
    })
}

fn truncated(primitive_type: PrimitiveType) -> ParquetError {
    ParquetError::corrupt(format!(
        "{} values run past the end of the page",
        primitive_type.type_name()
    ))
}
