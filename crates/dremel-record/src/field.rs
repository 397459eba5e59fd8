use crate::{RecordError, Result};
use dremel_core::{ParquetValue, PrimitiveType, SchemaNode};
use ordered_float::OrderedFloat;

/// A Rust type that can be stored in one field of a record.
///
/// The repetition of the field follows from the type: a plain type is
/// required, `Option<T>` is optional and `Vec<T>` is repeated.
pub trait ParquetField: Sized {
    /// Schema node for a field of this type named `name`
    fn schema_node(name: &str) -> Result<SchemaNode>;

    /// Convert `self` into the dynamic value the core writer shreds
    fn to_value(&self) -> ParquetValue;

    /// Rebuild a value from what the core reader assembled
    fn from_value(value: ParquetValue) -> Result<Self>;
}

fn mismatch(expected: &str, value: &ParquetValue) -> RecordError {
    RecordError::conversion(format!(
        "expected {expected}, found {}",
        value.type_name()
    ))
}

macro_rules! impl_primitive_field {
    ($ty:ty, $primitive:ident, $variant:ident) => {
        impl ParquetField for $ty {
            fn schema_node(name: &str) -> Result<SchemaNode> {
                Ok(SchemaNode::required(name, PrimitiveType::$primitive))
            }

            fn to_value(&self) -> ParquetValue {
                ParquetValue::$variant(*self)
            }

            fn from_value(value: ParquetValue) -> Result<Self> {
                match value {
                    ParquetValue::$variant(v) => Ok(v),
                    other => Err(mismatch(stringify!($primitive), &other)),
                }
            }
        }
    };
}

impl_primitive_field!(i32, Int32, Int32);
impl_primitive_field!(u32, UInt32, UInt32);
impl_primitive_field!(i64, Int64, Int64);
impl_primitive_field!(u64, UInt64, UInt64);
impl_primitive_field!(bool, Boolean, Boolean);

impl ParquetField for f32 {
    fn schema_node(name: &str) -> Result<SchemaNode> {
        Ok(SchemaNode::required(name, PrimitiveType::Float32))
    }

    fn to_value(&self) -> ParquetValue {
        ParquetValue::Float32(OrderedFloat(*self))
    }

    fn from_value(value: ParquetValue) -> Result<Self> {
        match value {
            ParquetValue::Float32(OrderedFloat(v)) => Ok(v),
            other => Err(mismatch("Float32", &other)),
        }
    }
}

impl ParquetField for f64 {
    fn schema_node(name: &str) -> Result<SchemaNode> {
        Ok(SchemaNode::required(name, PrimitiveType::Float64))
    }

    fn to_value(&self) -> ParquetValue {
        ParquetValue::Float64(OrderedFloat(*self))
    }

    fn from_value(value: ParquetValue) -> Result<Self> {
        match value {
            ParquetValue::Float64(OrderedFloat(v)) => Ok(v),
            other => Err(mismatch("Float64", &other)),
        }
    }
}

impl ParquetField for String {
    fn schema_node(name: &str) -> Result<SchemaNode> {
        Ok(SchemaNode::required(name, PrimitiveType::String))
    }

    fn to_value(&self) -> ParquetValue {
        ParquetValue::string(self)
    }

    fn from_value(value: ParquetValue) -> Result<Self> {
        match value {
            ParquetValue::String(s) => Ok(s.to_string()),
            other => Err(mismatch("String", &other)),
        }
    }
}

impl<T: ParquetField> ParquetField for Option<T> {
    fn schema_node(name: &str) -> Result<SchemaNode> {
        match T::schema_node(name)? {
            SchemaNode::Primitive {
                name,
                primitive_type,
                nullable: false,
            } => Ok(SchemaNode::Primitive {
                name,
                primitive_type,
                nullable: true,
            }),
            SchemaNode::Struct {
                name,
                fields,
                nullable: false,
            } => Ok(SchemaNode::Struct {
                name,
                fields,
                nullable: true,
            }),
            SchemaNode::List { name, .. } => Err(RecordError::schema(format!(
                "field '{name}': an optional list cannot be told apart from an empty one, use Vec<T>"
            ))),
            node => Err(RecordError::schema(format!(
                "field '{}': {} is already optional",
                node.name(),
                std::any::type_name::<T>()
            ))),
        }
    }

    fn to_value(&self) -> ParquetValue {
        match self {
            Some(v) => v.to_value(),
            None => ParquetValue::Null,
        }
    }

    fn from_value(value: ParquetValue) -> Result<Self> {
        match value {
            ParquetValue::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: ParquetField> ParquetField for Vec<T> {
    fn schema_node(name: &str) -> Result<SchemaNode> {
        let item = T::schema_node("element")?;
        match &item {
            SchemaNode::List { .. } => Err(RecordError::schema(format!(
                "field '{name}': lists of lists need an intermediate struct"
            ))),
            _ if item.is_nullable() => Err(RecordError::schema(format!(
                "field '{name}': list elements cannot be optional"
            ))),
            _ => Ok(SchemaNode::repeated(name, item)),
        }
    }

    fn to_value(&self) -> ParquetValue {
        ParquetValue::List(self.iter().map(ParquetField::to_value).collect())
    }

    fn from_value(value: ParquetValue) -> Result<Self> {
        match value {
            ParquetValue::List(items) => items.into_iter().map(T::from_value).collect(),
            // a missing repeated field is an empty one
            ParquetValue::Null => Ok(Vec::new()),
            other => Err(mismatch("List", &other)),
        }
    }
}
