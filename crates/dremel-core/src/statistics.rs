//! Min/max/null-count statistics of a column chunk.

use crate::encoding::plain::{decode_one, encode_one};
use crate::thrift_ext::format;
use crate::{ParquetError, ParquetValue, PrimitiveType, Result};
use std::cmp::Ordering;

/// Statistics gathered incrementally while values are added to a column.
///
/// Min and max follow the natural order of the primitive type: numbers by
/// value (unsigned types unsigned), strings byte-wise, `false < true`. NaN
/// never becomes a bound. Nulls only count towards `null_count`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatistics {
    min: Option<ParquetValue>,
    max: Option<ParquetValue>,
    null_count: u64,
}

fn compare(a: &ParquetValue, b: &ParquetValue) -> Option<Ordering> {
    use ParquetValue::*;
    match (a, b) {
        (Int32(a), Int32(b)) => Some(a.cmp(b)),
        (UInt32(a), UInt32(b)) => Some(a.cmp(b)),
        (Int64(a), Int64(b)) => Some(a.cmp(b)),
        (UInt64(a), UInt64(b)) => Some(a.cmp(b)),
        (Float32(a), Float32(b)) => a.0.partial_cmp(&b.0),
        (Float64(a), Float64(b)) => a.0.partial_cmp(&b.0),
        (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
        (String(a), String(b)) => Some(a.as_bytes().cmp(b.as_bytes())),
        _ => None,
    }
}

fn is_nan(value: &ParquetValue) -> bool {
    match value {
        ParquetValue::Float32(f) => f.0.is_nan(),
        ParquetValue::Float64(f) => f.0.is_nan(),
        _ => false,
    }
}

impl ColumnStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one present value
    pub fn update(&mut self, value: &ParquetValue) {
        if value.is_null() || is_nan(value) {
            return;
        }
        if self
            .min
            .as_ref()
            .map_or(true, |min| compare(value, min) == Some(Ordering::Less))
        {
            self.min = Some(value.clone());
        }
        if self
            .max
            .as_ref()
            .map_or(true, |max| compare(value, max) == Some(Ordering::Greater))
        {
            self.max = Some(value.clone());
        }
    }

    pub fn add_nulls(&mut self, count: u64) {
        self.null_count += count;
    }

    pub fn min(&self) -> Option<&ParquetValue> {
        self.min.as_ref()
    }

    pub fn max(&self) -> Option<&ParquetValue> {
        self.max.as_ref()
    }

    pub fn null_count(&self) -> u64 {
        self.null_count
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub(crate) fn to_thrift(&self, primitive_type: PrimitiveType) -> Result<format::Statistics> {
        let encode = |value: &Option<ParquetValue>| -> Result<Option<Vec<u8>>> {
            value
                .as_ref()
                .map(|v| {
                    let mut buf = Vec::new();
                    encode_one(primitive_type, v, &mut buf)?;
                    Ok(buf)
                })
                .transpose()
        };
        Ok(format::Statistics {
            null_count: Some(self.null_count as i64),
            min_value: encode(&self.min)?,
            max_value: encode(&self.max)?,
        })
    }

    pub(crate) fn from_thrift(
        primitive_type: PrimitiveType,
        stats: &format::Statistics,
    ) -> Result<Self> {
        let decode = |bytes: &Option<Vec<u8>>| -> Result<Option<ParquetValue>> {
            bytes
                .as_deref()
                .map(|mut b| {
                    let value = decode_one(primitive_type, &mut b)?;
                    if !b.is_empty() {
                        return Err(ParquetError::corrupt(format!(
                            "trailing bytes after {} statistic",
                            primitive_type.type_name()
                        )));
                    }
                    Ok(value)
                })
                .transpose()
        };
        Ok(ColumnStatistics {
            min: decode(&stats.min_value)?,
            max: decode(&stats.max_value)?,
            null_count: stats.null_count.unwrap_or(0).max(0) as u64,
        })
    }
}
