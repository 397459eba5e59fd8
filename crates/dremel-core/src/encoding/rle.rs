//! RLE / bit-packed hybrid encoding of definition and repetition levels.
//!
//! Runs are introduced by a ULEB128 header. An odd header announces
//! `header >> 1` bit-packed groups of eight values, an even one a run of
//! `header >> 1` copies of a single value stored little endian in
//! `ceil(bit_width / 8)` bytes.

use super::uleb128::{decode_uleb128, encode_uleb128};
use crate::{ParquetError, Result};
use bytes::BufMut;

/// Bit-packed runs fit their group count in a one byte header
const MAX_GROUPS_PER_RUN: usize = 63;
/// Repeats needed before a value is worth an RLE run
const MIN_RLE_RUN: usize = 8;

/// Bits needed to store levels up to `max_level`
pub fn bit_width(max_level: i16) -> u8 {
    (16 - (max_level.max(0) as u16).leading_zeros()) as u8
}

/// Streaming hybrid encoder.
///
/// Values are buffered in groups of eight; a group becomes part of a
/// bit-packed run unless the same value repeats at least eight times, in
/// which case the repeats are written as one RLE run.
#[derive(Debug)]
pub struct RleEncoder {
    bit_width: u8,
    out: Vec<u8>,
    previous: u64,
    buffered: [u64; 8],
    num_buffered: usize,
    repeat_count: usize,
    group_count: usize,
    header_pos: Option<usize>,
}

impl RleEncoder {
    pub fn new(bit_width: u8) -> Self {
        Self {
            bit_width,
            out: Vec::new(),
            previous: 0,
            buffered: [0; 8],
            num_buffered: 0,
            repeat_count: 0,
            group_count: 0,
            header_pos: None,
        }
    }

    pub fn put(&mut self, value: u64) {
        if value == self.previous {
            self.repeat_count += 1;
            if self.repeat_count >= MIN_RLE_RUN {
                // Certainly an RLE run, keep counting
                return;
            }
        } else {
            if self.repeat_count >= MIN_RLE_RUN {
                self.write_rle_run();
            }
            self.repeat_count = 1;
            self.previous = value;
        }

        self.buffered[self.num_buffered] = value;
        self.num_buffered += 1;
        if self.num_buffered == 8 {
            self.write_or_append_bit_packed_run();
        }
    }

    fn write_or_append_bit_packed_run(&mut self) {
        if self.group_count >= MAX_GROUPS_PER_RUN {
            self.end_bit_packed_run();
        }
        if self.header_pos.is_none() {
            // Placeholder until the group count is known
            self.header_pos = Some(self.out.len());
            self.out.put_u8(0);
        }

        pack_group(&self.buffered, self.bit_width, &mut self.out);
        self.num_buffered = 0;
        // Some repeats may just have been packed
        self.repeat_count = 0;
        self.group_count += 1;
    }

    fn end_bit_packed_run(&mut self) {
        if let Some(pos) = self.header_pos.take() {
            self.out[pos] = ((self.group_count << 1) | 1) as u8;
            self.group_count = 0;
        }
    }

    fn write_rle_run(&mut self) {
        self.end_bit_packed_run();
        encode_uleb128((self.repeat_count as u64) << 1, &mut self.out);
        let width = (self.bit_width as usize).div_ceil(8);
        self.out
            .extend_from_slice(&self.previous.to_le_bytes()[..width]);
        self.repeat_count = 0;
        self.num_buffered = 0;
    }

    /// Flush pending values and return the encoded bytes.
    ///
    /// A partial final group is padded with zeros; readers stop after the
    /// number of values they expect.
    pub fn finish(mut self) -> Vec<u8> {
        if self.repeat_count >= MIN_RLE_RUN {
            self.write_rle_run();
        } else if self.num_buffered > 0 {
            for slot in &mut self.buffered[self.num_buffered..] {
                *slot = 0;
            }
            self.write_or_append_bit_packed_run();
            self.end_bit_packed_run();
        } else {
            self.end_bit_packed_run();
        }
        self.out
    }
}

fn pack_group(values: &[u64; 8], bit_width: u8, out: &mut Vec<u8>) {
    let width = bit_width as usize;
    let start = out.len();
    out.resize(start + width, 0);
    for (i, &value) in values.iter().enumerate() {
        for bit in 0..width {
            if (value >> bit) & 1 == 1 {
                let pos = i * width + bit;
                out[start + pos / 8] |= 1 << (pos % 8);
            }
        }
    }
}

/// Decode exactly `num_values` hybrid encoded values from `data`
pub fn decode_hybrid(data: &[u8], bit_width: u8, num_values: usize) -> Result<Vec<u64>> {
    let width = bit_width as usize;
    // every byte holds at most eight values outside of RLE runs
    let mut values = Vec::with_capacity(num_values.min(data.len() * 8));
    let mut pos = 0;

    while values.len() < num_values {
        let (header, read) = decode_uleb128(&data[pos..])?;
        pos += read;
        let remaining = num_values - values.len();

        if header & 1 == 1 {
            let groups = usize::try_from(header >> 1).unwrap_or(usize::MAX);
            let packed = groups
                .checked_mul(width)
                .and_then(|num_bytes| data.get(pos..).and_then(|rest| rest.get(..num_bytes)))
                .ok_or_else(|| {
                    ParquetError::corrupt("bit-packed run runs past the end of the level data")
                })?;
            pos += packed.len();
            let count = groups.saturating_mul(8).min(remaining);
            if count == 0 {
                return Err(ParquetError::corrupt("empty bit-packed run"));
            }
            values.extend((0..count).map(|i| unpack(packed, i, width)));
        } else {
            let run = usize::try_from(header >> 1).unwrap_or(usize::MAX);
            if run == 0 {
                return Err(ParquetError::corrupt("empty RLE run"));
            }
            let value_bytes = width.div_ceil(8);
            let raw = data.get(pos..pos + value_bytes).ok_or_else(|| {
                ParquetError::corrupt("RLE run runs past the end of the level data")
            })?;
            pos += value_bytes;
            let mut le = [0u8; 8];
            le[..value_bytes].copy_from_slice(raw);
            let value = u64::from_le_bytes(le);
            values.extend(std::iter::repeat(value).take(run.min(remaining)));
        }
    }

    Ok(values)
}

fn unpack(packed: &[u8], index: usize, width: usize) -> u64 {
    let mut value = 0u64;
    for bit in 0..width {
        let pos = index * width + bit;
        if (packed[pos / 8] >> (pos % 8)) & 1 == 1 {
            value |= 1 << bit;
        }
    }
    value
}

/// Encode levels with a 4-byte little endian length prefix
pub fn encode_levels<B: BufMut>(levels: &[i16], bit_width: u8, out: &mut B) {
    let mut encoder = RleEncoder::new(bit_width);
    for &level in levels {
        encoder.put(level as u64);
    }
    let encoded = encoder.finish();
    out.put_u32_le(encoded.len() as u32);
    out.put_slice(&encoded);
}

/// Decode length-prefixed levels; returns the levels and the bytes read
pub fn decode_levels(data: &[u8], bit_width: u8, num_values: usize) -> Result<(Vec<i16>, usize)> {
    let prefix: [u8; 4] = data
        .get(..4)
        .and_then(|p| p.try_into().ok())
        .ok_or_else(|| ParquetError::corrupt("missing level length prefix"))?;
    let len = u32::from_le_bytes(prefix) as usize;
    let body = data[4..]
        .get(..len)
        .ok_or_else(|| ParquetError::corrupt("level data runs past the end of the page"))?;

    let levels = decode_hybrid(body, bit_width, num_values)?
        .into_iter()
        .map(|v| {
            i16::try_from(v).map_err(|_| ParquetError::corrupt(format!("level {v} out of range")))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((levels, 4 + len))
}
