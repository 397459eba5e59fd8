//! Test utilities for dremel-core

#[cfg(test)]
pub mod test {
    use crate::{ParquetValue, PrimitiveType, Schema, SchemaBuilder, SchemaNode};

    /// The nested document schema from the Dremel paper
    pub fn document_schema() -> Schema {
        SchemaBuilder::new()
            .with_root(SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::required("docid", PrimitiveType::Int64),
                    SchemaNode::Struct {
                        name: "links".to_string(),
                        nullable: true,
                        fields: vec![
                            SchemaNode::repeated(
                                "backward",
                                SchemaNode::required("element", PrimitiveType::Int64),
                            ),
                            SchemaNode::repeated(
                                "forward",
                                SchemaNode::required("element", PrimitiveType::Int64),
                            ),
                        ],
                    },
                    SchemaNode::repeated(
                        "names",
                        SchemaNode::Struct {
                            name: "element".to_string(),
                            nullable: false,
                            fields: vec![
                                SchemaNode::repeated(
                                    "languages",
                                    SchemaNode::Struct {
                                        name: "element".to_string(),
                                        nullable: false,
                                        fields: vec![
                                            SchemaNode::required("code", PrimitiveType::String),
                                            SchemaNode::optional("country", PrimitiveType::String),
                                        ],
                                    },
                                ),
                                SchemaNode::optional("url", PrimitiveType::String),
                            ],
                        },
                    ),
                ],
            })
            .build()
            .unwrap()
    }

    fn int64s(values: &[i64]) -> ParquetValue {
        ParquetValue::List(values.iter().map(|&v| ParquetValue::Int64(v)).collect())
    }

    fn language(code: &str, country: Option<&str>) -> ParquetValue {
        ParquetValue::record([
            ("code", ParquetValue::string(code)),
            (
                "country",
                country.map_or(ParquetValue::Null, ParquetValue::string),
            ),
        ])
    }

    fn name(languages: Vec<ParquetValue>, url: Option<&str>) -> ParquetValue {
        ParquetValue::record([
            ("languages", ParquetValue::List(languages)),
            ("url", url.map_or(ParquetValue::Null, ParquetValue::string)),
        ])
    }

    /// First document of the paper example
    pub fn document_r1() -> ParquetValue {
        ParquetValue::record([
            ("docid", ParquetValue::Int64(10)),
            (
                "links",
                ParquetValue::record([("backward", int64s(&[])), ("forward", int64s(&[20, 40, 60]))]),
            ),
            (
                "names",
                ParquetValue::List(vec![
                    name(
                        vec![language("en-us", Some("us")), language("en", None)],
                        Some("http://A"),
                    ),
                    name(vec![], Some("http://B")),
                    name(vec![language("en-gb", Some("gb"))], None),
                ]),
            ),
        ])
    }

    /// Second document of the paper example
    pub fn document_r2() -> ParquetValue {
        ParquetValue::record([
            ("docid", ParquetValue::Int64(20)),
            (
                "links",
                ParquetValue::record([("backward", int64s(&[10, 30])), ("forward", int64s(&[80]))]),
            ),
            (
                "names",
                ParquetValue::List(vec![name(vec![], Some("http://C"))]),
            ),
        ])
    }

    /// A flat schema mixing required and optional primitives
    pub fn sample_schema() -> Schema {
        SchemaBuilder::new()
            .with_root(SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::required("id", PrimitiveType::Int64),
                    SchemaNode::optional("name", PrimitiveType::String),
                    SchemaNode::optional("age", PrimitiveType::UInt32),
                    SchemaNode::optional("salary", PrimitiveType::Float64),
                    SchemaNode::required("active", PrimitiveType::Boolean),
                ],
            })
            .build()
            .unwrap()
    }
}
