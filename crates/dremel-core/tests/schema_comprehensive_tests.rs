use dremel_core::traits::SchemaInspector;
use dremel_core::*;
use std::io::Cursor;

use test_helpers::*;

fn root(fields: Vec<SchemaNode>) -> Schema {
    SchemaBuilder::new()
        .with_root(SchemaNode::Struct {
            name: "root".to_string(),
            nullable: false,
            fields,
        })
        .build()
        .unwrap()
}

#[test]
fn test_schema_builder_requires_root() {
    assert!(SchemaBuilder::new().build().is_err());
}

#[test]
fn test_resolution_errors() {
    // (label, schema, rejected as unsupported rather than invalid)
    let cases: Vec<(&str, Schema, bool)> = vec![
        (
            "nullable root",
            Schema {
                root: SchemaNode::Struct {
                    name: "root".to_string(),
                    nullable: true,
                    fields: vec![SchemaNode::required("a", PrimitiveType::Int32)],
                },
            },
            false,
        ),
        (
            "empty root",
            root(vec![]),
            false,
        ),
        (
            "empty name",
            root(vec![SchemaNode::required("", PrimitiveType::Int32)]),
            false,
        ),
        (
            "duplicate name",
            root(vec![
                SchemaNode::required("a", PrimitiveType::Int32),
                SchemaNode::optional("a", PrimitiveType::String),
            ]),
            false,
        ),
        (
            "list of lists",
            root(vec![SchemaNode::repeated(
                "matrix",
                SchemaNode::repeated("row", SchemaNode::required("element", PrimitiveType::Int32)),
            )]),
            true,
        ),
        (
            "nullable list",
            root(vec![SchemaNode::List {
                name: "tags".to_string(),
                nullable: true,
                item: Box::new(SchemaNode::required("element", PrimitiveType::String)),
            }]),
            true,
        ),
        (
            "embedded list item",
            root(vec![SchemaNode::repeated(
                "items",
                SchemaNode::Embedded {
                    name: "Base".to_string(),
                    fields: vec![SchemaNode::required("id", PrimitiveType::Int32)],
                },
            )]),
            true,
        ),
    ];

    for (label, schema, unsupported) in cases {
        let err = SchemaTree::try_new(&schema).unwrap_err();
        if unsupported {
            assert!(matches!(err, ParquetError::Unsupported(_)), "{label}: {err}");
        } else {
            assert!(matches!(err, ParquetError::Schema(_)), "{label}: {err}");
        }
        // The writer compiles the same way
        assert!(Writer::new(Vec::new(), schema).is_err(), "{label}");
    }
}

#[test]
fn test_list_of_struct_of_list_is_fine() {
    let schema = root(vec![SchemaNode::repeated(
        "matrix",
        SchemaNode::Struct {
            name: "element".to_string(),
            nullable: false,
            fields: vec![SchemaNode::repeated(
                "row",
                SchemaNode::required("element", PrimitiveType::Int32),
            )],
        },
    )]);
    let row = |values: &[i32]| {
        ParquetValue::record([(
            "row",
            ParquetValue::List(values.iter().map(|&v| ParquetValue::Int32(v)).collect()),
        )])
    };
    let rows = vec![
        ParquetValue::record([("matrix", ParquetValue::List(vec![row(&[1, 2]), row(&[]), row(&[3])]))]),
        ParquetValue::record([("matrix", ParquetValue::List(vec![]))]),
    ];
    test_roundtrip(rows, schema).unwrap();
}

#[test]
fn test_embedded_struct_is_inlined() {
    let schema = root(vec![
        SchemaNode::Embedded {
            name: "Audit".to_string(),
            fields: vec![
                SchemaNode::required("created", PrimitiveType::Int64),
                SchemaNode::optional("updated", PrimitiveType::Int64),
            ],
        },
        SchemaNode::required("title", PrimitiveType::String),
    ]);
    let record = ParquetValue::record([
        ("created", ParquetValue::Int64(1)),
        ("updated", ParquetValue::Null),
        ("title", ParquetValue::string("hello")),
    ]);

    let bytes = write_to_bytes(&[record.clone()], schema, WriterBuilder::new()).unwrap();
    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    // The embedding leaves no trace in the file
    assert_eq!(
        reader.schema(),
        &root(vec![
            SchemaNode::required("created", PrimitiveType::Int64),
            SchemaNode::optional("updated", PrimitiveType::Int64),
            SchemaNode::required("title", PrimitiveType::String),
        ])
    );
    let rows: Vec<ParquetValue> = reader.read_rows().collect::<Result<_>>().unwrap();
    assert_eq!(rows, vec![record]);
}

#[test]
fn test_schema_rebuilt_from_footer() {
    let bytes = write_to_bytes(&[], document_schema(), WriterBuilder::new()).unwrap();
    let reader = Reader::new(Cursor::new(bytes)).unwrap();
    assert_eq!(reader.schema(), &document_schema());

    let paths: Vec<String> = reader.columns().map(|c| c.name()).collect();
    assert_eq!(
        paths,
        vec![
            "docid",
            "links.backward",
            "links.forward",
            "names.languages.code",
            "names.languages.country",
            "names.url",
        ]
    );
}

#[test]
fn test_inspector_over_document_schema() {
    let schema = document_schema();
    assert!(schema.has_field("names.languages.country"));
    assert!(!schema.has_field("names.element"));
    assert_eq!(
        schema.get_field_by_path("links.forward").map(|f| f.repetition()),
        Some(Repetition::Repeated)
    );
    assert_eq!(
        schema.get_field_by_path("names.url").map(|f| f.is_nullable()),
        Some(true)
    );
}

#[test]
fn test_record_validation() {
    let mut writer = Writer::new(Vec::new(), document_schema()).unwrap();

    let cases = vec![
        ParquetValue::Int64(1),
        ParquetValue::record([("docid", ParquetValue::Null)]),
        ParquetValue::record([("docid", ParquetValue::Int32(1))]),
        ParquetValue::record([("docid", ParquetValue::Int64(1)), ("names", ParquetValue::Null)]),
        ParquetValue::record([
            ("docid", ParquetValue::Int64(1)),
            ("names", ParquetValue::List(vec![ParquetValue::Int64(1)])),
        ]),
        ParquetValue::record([("docid", ParquetValue::Int64(1)), ("extra", ParquetValue::Null)]),
    ];
    for record in cases {
        let err = writer.write_row(record.clone()).unwrap_err();
        assert!(
            matches!(err, ParquetError::DataValidation(_)),
            "{record:?}: {err}"
        );
    }
    assert_eq!(writer.num_rows(), 0);
}
