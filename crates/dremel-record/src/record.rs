use crate::{ParquetField, RecordError, Result};
use dremel_core::{ParquetValue, Schema, SchemaNode};
use indexmap::IndexMap;
use std::sync::Arc;

#[doc(hidden)]
pub type FieldMap = IndexMap<Arc<str>, ParquetValue>;

/// A struct stored as one row of a file.
///
/// Implemented by [`parquet_record!`](crate::parquet_record); every record is
/// also a [`ParquetField`] so records nest inside other records.
pub trait ParquetRecord: ParquetField {
    /// Fields of the record, in column order
    fn fields() -> Result<Vec<SchemaNode>>;

    /// Schema of a file holding rows of this record
    fn schema() -> Result<Schema> {
        Ok(Schema {
            root: SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: Self::fields()?,
            },
        })
    }

    /// Append the record's column values to `out`, embedded records inlined
    #[doc(hidden)]
    fn push_values(&self, out: &mut Vec<(Arc<str>, ParquetValue)>);

    /// Build the record from the columns in `fields`, removing the ones used
    #[doc(hidden)]
    fn take_fields(fields: &mut FieldMap) -> Result<Self>;
}

#[doc(hidden)]
pub fn into_fields(
    value: ParquetValue,
    type_name: &str,
) -> Result<IndexMap<Arc<str>, ParquetValue>> {
    match value {
        ParquetValue::Record(fields) => Ok(fields),
        other => Err(RecordError::conversion(format!(
            "expected a record for {type_name}, found {}",
            other.type_name()
        ))),
    }
}

#[doc(hidden)]
pub fn take_field<T: ParquetField>(
    fields: &mut IndexMap<Arc<str>, ParquetValue>,
    column: &str,
) -> Result<T> {
    let value = fields.swap_remove(column).unwrap_or(ParquetValue::Null);
    T::from_value(value).map_err(|e| e.in_column(column))
}

#[doc(hidden)]
pub fn push_field<T: ParquetField>(
    out: &mut Vec<(Arc<str>, ParquetValue)>,
    column: &str,
    value: &T,
) {
    out.push((Arc::from(column), value.to_value()));
}

#[doc(hidden)]
pub fn embedded_node<T: ParquetRecord>(name: &str) -> Result<SchemaNode> {
    Ok(SchemaNode::Embedded {
        name: name.to_string(),
        fields: T::fields()?,
    })
}

/// Declare a struct whose fields map onto named columns.
///
/// Each field names its column after `=>`. A field marked `#[embed]` holds
/// another record whose columns are inlined into this one; the attribute
/// must come before any other attribute of the field. The macro implements
/// [`ParquetRecord`] and [`ParquetField`] for the struct.
///
/// ```
/// use dremel_record::{parquet_record, ParquetRecord};
///
/// parquet_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Audit {
///         pub created_by: String => "created_by",
///     }
/// }
///
/// parquet_record! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub struct Person {
///         pub id: i64 => "id",
///         pub email: Option<String> => "email_address",
///         pub tags: Vec<String> => "tags",
///         #[embed]
///         pub audit: Audit,
///     }
/// }
///
/// let schema = Person::schema().unwrap();
/// assert_eq!(schema.root.name(), "root");
/// ```
#[macro_export]
macro_rules! parquet_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident { $($body:tt)* }
    ) => {
        $crate::__parquet_record! {
            @munch [$(#[$meta])*] $vis $name [] $($body)*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __parquet_record {
    (@munch $meta:tt $vis:vis $name:ident [$($fields:tt)+]) => {
        $crate::__parquet_record! { @emit $meta $vis $name [$($fields)+] }
    };

    (@munch $meta:tt $vis:vis $name:ident [$($fields:tt)*]
        #[embed]
        $(#[$field_meta:meta])*
        $field_vis:vis $field:ident : $ty:ty
        $(, $($rest:tt)*)?
    ) => {
        $crate::__parquet_record! {
            @munch $meta $vis $name
            [$($fields)* { [$(#[$field_meta])*] $field_vis $field : $ty ; embed $field }]
            $($($rest)*)?
        }
    };

    (@munch $meta:tt $vis:vis $name:ident [$($fields:tt)*]
        $(#[$field_meta:meta])*
        $field_vis:vis $field:ident : $ty:ty => $column:literal
        $(, $($rest:tt)*)?
    ) => {
        $crate::__parquet_record! {
            @munch $meta $vis $name
            [$($fields)* { [$(#[$field_meta])*] $field_vis $field : $ty ; column $column }]
            $($($rest)*)?
        }
    };

    (@emit [$(#[$meta:meta])*] $vis:vis $name:ident [$({
        [$(#[$field_meta:meta])*] $field_vis:vis $field:ident : $ty:ty ; $kind:ident $key:tt
    })+]) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )+
        }

        impl $crate::ParquetRecord for $name {
            fn fields() -> $crate::Result<::std::vec::Vec<$crate::dremel_core::SchemaNode>> {
                ::std::result::Result::Ok(::std::vec![
                    $($crate::__parquet_record!(@node $kind $ty, $key)?,)+
                ])
            }

            fn push_values(
                &self,
                out: &mut ::std::vec::Vec<(
                    ::std::sync::Arc<str>,
                    $crate::dremel_core::ParquetValue,
                )>,
            ) {
                $($crate::__parquet_record!(@push $kind $ty, $key, &self.$field, out);)+
            }

            fn take_fields(
                fields: &mut $crate::record::FieldMap,
            ) -> $crate::Result<Self> {
                ::std::result::Result::Ok($name {
                    $($field: $crate::__parquet_record!(@take $kind $ty, $key, fields)?,)+
                })
            }
        }

        impl $crate::ParquetField for $name {
            fn schema_node(name: &str) -> $crate::Result<$crate::dremel_core::SchemaNode> {
                ::std::result::Result::Ok($crate::dremel_core::SchemaNode::Struct {
                    name: ::std::string::ToString::to_string(name),
                    nullable: false,
                    fields: <$name as $crate::ParquetRecord>::fields()?,
                })
            }

            fn to_value(&self) -> $crate::dremel_core::ParquetValue {
                let mut out = ::std::vec::Vec::new();
                $crate::ParquetRecord::push_values(self, &mut out);
                $crate::dremel_core::ParquetValue::record(out)
            }

            fn from_value(value: $crate::dremel_core::ParquetValue) -> $crate::Result<Self> {
                let mut fields = $crate::record::into_fields(value, stringify!($name))?;
                <$name as $crate::ParquetRecord>::take_fields(&mut fields)
            }
        }
    };

    (@node column $ty:ty, $column:tt) => {
        <$ty as $crate::ParquetField>::schema_node($column)
    };
    (@node embed $ty:ty, $field:tt) => {
        $crate::record::embedded_node::<$ty>(stringify!($field))
    };

    (@push column $ty:ty, $column:tt, $value:expr, $out:ident) => {
        $crate::record::push_field::<$ty>($out, $column, $value)
    };
    (@push embed $ty:ty, $field:tt, $value:expr, $out:ident) => {
        <$ty as $crate::ParquetRecord>::push_values($value, $out)
    };

    (@take column $ty:ty, $column:tt, $fields:ident) => {
        $crate::record::take_field::<$ty>($fields, $column)
    };
    (@take embed $ty:ty, $field:tt, $fields:ident) => {
        <$ty as $crate::ParquetRecord>::take_fields($fields)
    };
}

#[cfg(test)]
mod tests {
    use crate::{parquet_record, ParquetField, ParquetRecord, RecordError};
    use dremel_core::{ParquetValue, PrimitiveType, SchemaNode};

    parquet_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Point {
            x: f64 => "x_coord",
            label: Option<String> => "label",
        }
    }

    parquet_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Path {
            id: u64 => "id",
            points: Vec<Point> => "points",
        }
    }

    parquet_record! {
        #[derive(Debug, Clone, PartialEq)]
        struct Labeled {
            #[embed]
            point: Point,
            /// Display name
            name: String => "name",
        }
    }

    #[test]
    fn test_schema_uses_column_names() {
        let schema = Path::schema().unwrap();
        assert_eq!(
            schema.root,
            SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::required("id", PrimitiveType::UInt64),
                    SchemaNode::repeated(
                        "points",
                        SchemaNode::Struct {
                            name: "element".to_string(),
                            nullable: false,
                            fields: vec![
                                SchemaNode::required("x_coord", PrimitiveType::Float64),
                                SchemaNode::optional("label", PrimitiveType::String),
                            ],
                        },
                    ),
                ],
            }
        );
    }

    #[test]
    fn test_value_conversion() {
        let path = Path {
            id: 3,
            points: vec![
                Point { x: 1.0, label: None },
                Point { x: -2.0, label: Some("b".to_string()) },
            ],
        };
        let value = path.to_value();
        assert_eq!(
            value.field("points").and_then(|p| p.as_list()).map(|p| p.len()),
            Some(2)
        );
        assert_eq!(Path::from_value(value).unwrap(), path);
    }

    #[test]
    fn test_conversion_errors_name_the_column() {
        let value = ParquetValue::record([
            ("id", ParquetValue::UInt64(1)),
            (
                "points",
                ParquetValue::List(vec![ParquetValue::record([(
                    "x_coord",
                    ParquetValue::string("oops"),
                )])]),
            ),
        ]);
        match Path::from_value(value).unwrap_err() {
            RecordError::Conversion(msg) => {
                assert!(msg.contains("'points'"), "{msg}");
                assert!(msg.contains("'x_coord'"), "{msg}");
            }
            other => panic!("unexpected error {other}"),
        }

        assert!(Path::from_value(ParquetValue::Int32(1)).is_err());
    }

    #[test]
    fn test_embedded_record_is_inlined() {
        let schema = Labeled::schema().unwrap();
        assert_eq!(
            schema.root,
            SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::Embedded {
                        name: "point".to_string(),
                        fields: vec![
                            SchemaNode::required("x_coord", PrimitiveType::Float64),
                            SchemaNode::optional("label", PrimitiveType::String),
                        ],
                    },
                    SchemaNode::required("name", PrimitiveType::String),
                ],
            }
        );

        let labeled = Labeled {
            point: Point { x: 0.5, label: Some("p".to_string()) },
            name: "origin".to_string(),
        };
        let value = labeled.to_value();
        assert_eq!(
            value,
            ParquetValue::record([
                ("x_coord", 0.5f64.to_value()),
                ("label", ParquetValue::string("p")),
                ("name", ParquetValue::string("origin")),
            ])
        );
        assert_eq!(Labeled::from_value(value).unwrap(), labeled);

        let missing = ParquetValue::record([("name", ParquetValue::string("origin"))]);
        match Labeled::from_value(missing).unwrap_err() {
            RecordError::Conversion(msg) => assert!(msg.contains("'x_coord'"), "{msg}"),
            other => panic!("unexpected error {other}"),
        }
    }
}
