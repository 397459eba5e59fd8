//! Conversions between the schema/column model and footer metadata.

use crate::column::LeafColumn;
use crate::compression::Compression;
use crate::statistics::ColumnStatistics;
use crate::thrift_ext::format::{
    self, converted_type, field_repetition, physical_type, SchemaElement,
};
use crate::tree::{NodeId, SchemaTree};
use crate::{ParquetError, PrimitiveType, Repetition, Result, Schema, SchemaNode};

/// Physical type a primitive is stored as
pub fn physical_type_of(primitive_type: PrimitiveType) -> i32 {
    match primitive_type {
        PrimitiveType::Int32 | PrimitiveType::UInt32 => physical_type::INT32,
        PrimitiveType::Int64 | PrimitiveType::UInt64 => physical_type::INT64,
        PrimitiveType::Float32 => physical_type::FLOAT,
        PrimitiveType::Float64 => physical_type::DOUBLE,
        PrimitiveType::Boolean => physical_type::BOOLEAN,
        PrimitiveType::String => physical_type::BYTE_ARRAY,
    }
}

/// Converted type annotation of a primitive, if it needs one
pub fn converted_type_of(primitive_type: PrimitiveType) -> Option<i32> {
    match primitive_type {
        PrimitiveType::UInt32 => Some(converted_type::UINT_32),
        PrimitiveType::UInt64 => Some(converted_type::UINT_64),
        PrimitiveType::String => Some(converted_type::UTF8),
        _ => None,
    }
}

/// Primitive for a physical/converted type pair found in a footer
pub fn primitive_type_from(physical: i32, converted: Option<i32>) -> Result<PrimitiveType> {
    Ok(match (physical, converted) {
        (physical_type::INT32, None) => PrimitiveType::Int32,
        (physical_type::INT32, Some(converted_type::UINT_32)) => PrimitiveType::UInt32,
        (physical_type::INT64, None) => PrimitiveType::Int64,
        (physical_type::INT64, Some(converted_type::UINT_64)) => PrimitiveType::UInt64,
        (physical_type::FLOAT, None) => PrimitiveType::Float32,
        (physical_type::DOUBLE, None) => PrimitiveType::Float64,
        (physical_type::BOOLEAN, None) => PrimitiveType::Boolean,
        (physical_type::BYTE_ARRAY, None | Some(converted_type::UTF8)) => PrimitiveType::String,
        (physical_type::INT96 | physical_type::FIXED_LEN_BYTE_ARRAY, _) => {
            return Err(ParquetError::unsupported(format!(
                "physical type {physical}"
            )))
        }
        (physical, Some(converted)) => {
            return Err(ParquetError::unsupported(format!(
                "converted type {converted} on physical type {physical}"
            )))
        }
        (physical, None) => {
            return Err(ParquetError::corrupt(format!("unknown physical type {physical}")))
        }
    })
}

fn repetition_code(repetition: Repetition) -> i32 {
    match repetition {
        Repetition::Required => field_repetition::REQUIRED,
        Repetition::Optional => field_repetition::OPTIONAL,
        Repetition::Repeated => field_repetition::REPEATED,
    }
}

/// Depth-first schema elements, starting with a root named `root`
pub fn schema_to_elements(tree: &SchemaTree) -> Vec<SchemaElement> {
    let mut elements = vec![SchemaElement {
        name: "root".to_string(),
        num_children: Some(tree.children(tree.root()).len() as i32),
        ..Default::default()
    }];
    for &child in tree.children(tree.root()) {
        push_elements(tree, child, &mut elements);
    }
    elements
}

fn push_elements(tree: &SchemaTree, id: NodeId, elements: &mut Vec<SchemaElement>) {
    let node = tree.node(id);
    let mut element = SchemaElement {
        name: node.name().to_string(),
        repetition_type: Some(repetition_code(node.repetition())),
        ..Default::default()
    };
    match node.primitive_type() {
        Some(primitive_type) => {
            element.physical_type = Some(physical_type_of(primitive_type));
            element.converted_type = converted_type_of(primitive_type);
            elements.push(element);
        }
        None => {
            element.num_children = Some(node.children().len() as i32);
            elements.push(element);
            for &child in node.children() {
                push_elements(tree, child, elements);
            }
        }
    }
}

/// Deepest group nesting accepted from a footer
const MAX_SCHEMA_DEPTH: usize = 64;

/// Rebuild a schema from footer elements.
///
/// Repeated groups and leaves become lists whose item is named `element`.
pub fn schema_from_elements(elements: &[SchemaElement]) -> Result<Schema> {
    let root = elements
        .first()
        .ok_or_else(|| ParquetError::corrupt("footer has no schema"))?;
    let num_children = root.num_children.unwrap_or(0);
    let mut pos = 1;
    let fields = (0..num_children)
        .map(|_| element_to_node(elements, &mut pos, 1))
        .collect::<Result<Vec<_>>>()?;
    if pos != elements.len() {
        return Err(ParquetError::corrupt(format!(
            "schema has {} trailing elements",
            elements.len() - pos
        )));
    }
    Ok(Schema {
        root: SchemaNode::Struct {
            name: root.name.clone(),
            nullable: false,
            fields,
        },
    })
}

fn element_to_node(elements: &[SchemaElement], pos: &mut usize, depth: usize) -> Result<SchemaNode> {
    let element = elements
        .get(*pos)
        .ok_or_else(|| ParquetError::corrupt("schema ends inside a group"))?;
    *pos += 1;
    if depth > MAX_SCHEMA_DEPTH {
        return Err(ParquetError::corrupt(format!(
            "field `{}` is nested deeper than {MAX_SCHEMA_DEPTH} levels",
            element.name
        )));
    }

    let repetition = match element.repetition_type {
        None | Some(field_repetition::REQUIRED) => Repetition::Required,
        Some(field_repetition::OPTIONAL) => Repetition::Optional,
        Some(field_repetition::REPEATED) => Repetition::Repeated,
        Some(other) => {
            return Err(ParquetError::corrupt(format!(
                "field `{}` has unknown repetition {}",
                element.name, other
            )))
        }
    };
    let nullable = repetition == Repetition::Optional;

    let inner = match element.num_children {
        Some(n) if n > 0 => {
            let fields = (0..n)
                .map(|_| element_to_node(elements, pos, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            SchemaNode::Struct {
                name: element.name.clone(),
                nullable,
                fields,
            }
        }
        _ => {
            let physical = element.physical_type.ok_or_else(|| {
                ParquetError::corrupt(format!("leaf `{}` has no physical type", element.name))
            })?;
            SchemaNode::Primitive {
                name: element.name.clone(),
                primitive_type: primitive_type_from(physical, element.converted_type)?,
                nullable,
            }
        }
    };

    Ok(match repetition {
        Repetition::Repeated => SchemaNode::List {
            name: element.name.clone(),
            nullable: false,
            item: Box::new(rename(inner, "element")),
        },
        _ => inner,
    })
}

fn rename(node: SchemaNode, new_name: &str) -> SchemaNode {
    match node {
        SchemaNode::Struct { fields, .. } => SchemaNode::Struct {
            name: new_name.to_string(),
            nullable: false,
            fields,
        },
        SchemaNode::Primitive { primitive_type, .. } => SchemaNode::Primitive {
            name: new_name.to_string(),
            primitive_type,
            nullable: false,
        },
        other => other,
    }
}

/// Metadata of one column chunk
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnChunkMetadata {
    pub path: Vec<String>,
    pub primitive_type: PrimitiveType,
    pub compression: Compression,
    /// Level entries (or values, for columns without levels)
    pub num_values: i64,
    pub total_compressed_size: i64,
    pub total_uncompressed_size: i64,
    pub data_page_offset: i64,
    pub statistics: Option<ColumnStatistics>,
}

/// Metadata of one row group
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroupMetadata {
    pub num_rows: i64,
    pub total_byte_size: i64,
    pub columns: Vec<ColumnChunkMetadata>,
}

/// File level metadata decoded from the footer
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    pub version: i32,
    pub num_rows: i64,
    pub created_by: Option<String>,
    pub key_value_metadata: Vec<(String, Option<String>)>,
    pub row_groups: Vec<RowGroupMetadata>,
}

impl FileMetadata {
    pub(crate) fn try_from_thrift(
        metadata: &format::FileMetaData,
        columns: &[LeafColumn],
    ) -> Result<Self> {
        let row_groups = metadata
            .row_groups
            .iter()
            .map(|rg| RowGroupMetadata::try_from_thrift(rg, columns))
            .collect::<Result<Vec<_>>>()?;
        Ok(FileMetadata {
            version: metadata.version,
            num_rows: metadata.num_rows,
            created_by: metadata.created_by.clone(),
            key_value_metadata: metadata
                .key_value_metadata
                .iter()
                .flatten()
                .map(|kv| (kv.key.clone(), kv.value.clone()))
                .collect(),
            row_groups,
        })
    }

    /// Value of a key/value metadata entry
    pub fn get(&self, key: &str) -> Option<&str> {
        self.key_value_metadata
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.as_deref())
    }
}

impl RowGroupMetadata {
    fn try_from_thrift(row_group: &format::RowGroup, columns: &[LeafColumn]) -> Result<Self> {
        if row_group.columns.len() != columns.len() {
            return Err(ParquetError::corrupt(format!(
                "row group has {} column chunks, schema has {} columns",
                row_group.columns.len(),
                columns.len()
            )));
        }
        let chunks = row_group
            .columns
            .iter()
            .zip(columns)
            .map(|(chunk, column)| ColumnChunkMetadata::try_from_thrift(chunk, column))
            .collect::<Result<Vec<_>>>()?;
        Ok(RowGroupMetadata {
            num_rows: row_group.num_rows,
            total_byte_size: row_group.total_byte_size,
            columns: chunks,
        })
    }
}

impl ColumnChunkMetadata {
    fn try_from_thrift(chunk: &format::ColumnChunk, column: &LeafColumn) -> Result<Self> {
        let meta = column_meta(chunk, column)?;
        let statistics = meta
            .statistics
            .as_ref()
            .map(|s| ColumnStatistics::from_thrift(column.primitive_type(), s))
            .transpose()?;
        Ok(ColumnChunkMetadata {
            path: meta.path_in_schema.clone(),
            primitive_type: column.primitive_type(),
            compression: Compression::from_codec(meta.codec)?,
            num_values: meta.num_values,
            total_compressed_size: meta.total_compressed_size,
            total_uncompressed_size: meta.total_uncompressed_size,
            data_page_offset: meta.data_page_offset,
            statistics,
        })
    }
}

/// Column metadata of `chunk`, checked against the column it should hold
pub(crate) fn column_meta<'a>(
    chunk: &'a format::ColumnChunk,
    column: &LeafColumn,
) -> Result<&'a format::ColumnMetaData> {
    let meta = chunk.meta_data.as_ref().ok_or_else(|| {
        ParquetError::unsupported(format!(
            "column chunk for `{}` stored outside the file",
            column.name()
        ))
    })?;
    let path_matches = meta.path_in_schema.len() == column.path().len()
        && meta
            .path_in_schema
            .iter()
            .zip(column.path())
            .all(|(a, b)| a.as_str() == b.as_ref());
    if !path_matches {
        return Err(ParquetError::corrupt(format!(
            "column chunk for `{}` found where `{}` was expected",
            meta.path_in_schema.join("."),
            column.name()
        )));
    }
    if meta.physical_type != physical_type_of(column.primitive_type()) {
        return Err(ParquetError::corrupt(format!(
            "column chunk for `{}` has physical type {}",
            column.name(),
            meta.physical_type
        )));
    }
    Ok(meta)
}
