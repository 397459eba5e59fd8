use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use std::sync::Arc;

/// Dynamic representation of a record and everything nested in it.
///
/// Writers read from a `Record` tree; readers mutate a caller supplied one.
/// `Null` marks an absent optional field and `List` holds the elements of a
/// repeated field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParquetValue {
    // Numeric types
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(OrderedFloat<f32>),
    Float64(OrderedFloat<f64>),

    // Basic types
    Boolean(bool),
    String(Arc<str>),

    // Complex types
    List(Vec<ParquetValue>),
    Record(IndexMap<Arc<str>, ParquetValue>), // preserves field order

    // Null value
    Null,
}

impl std::hash::Hash for ParquetValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            ParquetValue::Int32(i) => i.hash(state),
            ParquetValue::UInt32(i) => i.hash(state),
            ParquetValue::Int64(i) => i.hash(state),
            ParquetValue::UInt64(i) => i.hash(state),
            ParquetValue::Float32(f) => f.hash(state),
            ParquetValue::Float64(f) => f.hash(state),
            ParquetValue::Boolean(b) => b.hash(state),
            ParquetValue::String(s) => s.hash(state),
            ParquetValue::List(l) => l.hash(state),
            ParquetValue::Record(r) => {
                // Equality ignores field order, so hashing must too
                let mut entries: Vec<_> = r.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));
                for (k, v) in entries {
                    k.hash(state);
                    v.hash(state);
                }
            }
            ParquetValue::Null => 0_i32.hash(state),
        }
    }
}

impl ParquetValue {
    /// Build a record from `(name, value)` pairs, keeping their order
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<Arc<str>>,
        I: IntoIterator<Item = (K, ParquetValue)>,
    {
        ParquetValue::Record(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a string value
    pub fn string<S: AsRef<str>>(s: S) -> Self {
        ParquetValue::String(Arc::from(s.as_ref()))
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, ParquetValue::Null)
    }

    /// Fields of a record value
    pub fn as_record(&self) -> Option<&IndexMap<Arc<str>, ParquetValue>> {
        match self {
            ParquetValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut IndexMap<Arc<str>, ParquetValue>> {
        match self {
            ParquetValue::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Elements of a list value
    pub fn as_list(&self) -> Option<&[ParquetValue]> {
        match self {
            ParquetValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a field of a record value; `None` for non-records or missing keys
    pub fn field(&self, name: &str) -> Option<&ParquetValue> {
        self.as_record().and_then(|fields| fields.get(name))
    }

    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            ParquetValue::Int32(_) => "Int32",
            ParquetValue::UInt32(_) => "UInt32",
            ParquetValue::Int64(_) => "Int64",
            ParquetValue::UInt64(_) => "UInt64",
            ParquetValue::Float32(_) => "Float32",
            ParquetValue::Float64(_) => "Float64",
            ParquetValue::Boolean(_) => "Boolean",
            ParquetValue::String(_) => "String",
            ParquetValue::List(_) => "List",
            ParquetValue::Record(_) => "Record",
            ParquetValue::Null => "Null",
        }
    }
}
