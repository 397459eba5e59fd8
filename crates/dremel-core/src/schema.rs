use crate::ParquetValue;

/// Declared schema of the records stored in a file
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub root: SchemaNode,
}

/// Represents a node in the declared schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// A struct with named fields
    Struct {
        name: String,
        nullable: bool,
        fields: Vec<SchemaNode>,
    },
    /// A repeated field; `item` describes one element and its name is ignored
    List {
        name: String,
        nullable: bool,
        item: Box<SchemaNode>,
    },
    /// A struct whose fields are inlined into the enclosing struct
    Embedded { name: String, fields: Vec<SchemaNode> },
    /// A primitive/leaf type
    Primitive {
        name: String,
        primitive_type: PrimitiveType,
        nullable: bool,
    },
}

/// Primitive data types a leaf column can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
    Boolean,
    String,
}

/// Represents how values are repeated in Parquet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Repetition {
    /// Field must have exactly one value
    Required,
    /// Field can have 0 or 1 value
    Optional,
    /// Field can have 0 or more values
    Repeated,
}

impl SchemaNode {
    /// Get the name of this schema node
    pub fn name(&self) -> &str {
        match self {
            SchemaNode::Struct { name, .. } => name,
            SchemaNode::List { name, .. } => name,
            SchemaNode::Embedded { name, .. } => name,
            SchemaNode::Primitive { name, .. } => name,
        }
    }

    /// Check if this node is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            SchemaNode::Struct { nullable, .. } => *nullable,
            SchemaNode::List { nullable, .. } => *nullable,
            SchemaNode::Embedded { .. } => false,
            SchemaNode::Primitive { nullable, .. } => *nullable,
        }
    }

    /// Repetition of this node relative to its parent
    pub fn repetition(&self) -> Repetition {
        match self {
            SchemaNode::List { .. } => Repetition::Repeated,
            _ if self.is_nullable() => Repetition::Optional,
            _ => Repetition::Required,
        }
    }

    /// Shorthand for a required primitive field
    pub fn required(name: impl Into<String>, primitive_type: PrimitiveType) -> Self {
        SchemaNode::Primitive {
            name: name.into(),
            primitive_type,
            nullable: false,
        }
    }

    /// Shorthand for an optional primitive field
    pub fn optional(name: impl Into<String>, primitive_type: PrimitiveType) -> Self {
        SchemaNode::Primitive {
            name: name.into(),
            primitive_type,
            nullable: true,
        }
    }

    /// Shorthand for a repeated field of `item`
    pub fn repeated(name: impl Into<String>, item: SchemaNode) -> Self {
        SchemaNode::List {
            name: name.into(),
            nullable: false,
            item: Box::new(item),
        }
    }
}

impl PrimitiveType {
    /// Get the logical type name for display
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveType::Int32 => "Int32",
            PrimitiveType::UInt32 => "UInt32",
            PrimitiveType::Int64 => "Int64",
            PrimitiveType::UInt64 => "UInt64",
            PrimitiveType::Float32 => "Float32",
            PrimitiveType::Float64 => "Float64",
            PrimitiveType::Boolean => "Boolean",
            PrimitiveType::String => "String",
        }
    }

    /// Check whether a non-null value can be stored in a column of this type
    pub fn matches(&self, value: &ParquetValue) -> bool {
        matches!(
            (self, value),
            (PrimitiveType::Int32, ParquetValue::Int32(_))
                | (PrimitiveType::UInt32, ParquetValue::UInt32(_))
                | (PrimitiveType::Int64, ParquetValue::Int64(_))
                | (PrimitiveType::UInt64, ParquetValue::UInt64(_))
                | (PrimitiveType::Float32, ParquetValue::Float32(_))
                | (PrimitiveType::Float64, ParquetValue::Float64(_))
                | (PrimitiveType::Boolean, ParquetValue::Boolean(_))
                | (PrimitiveType::String, ParquetValue::String(_))
        )
    }
}

/// Builder for creating schemas
pub struct SchemaBuilder {
    root: Option<SchemaNode>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn with_root(mut self, root: SchemaNode) -> Self {
        self.root = Some(root);
        self
    }

    pub fn build(self) -> Result<Schema, &'static str> {
        match self.root {
            Some(root) => Ok(Schema { root }),
            None => Err("Schema must have a root node"),
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_creation() {
        let schema = SchemaBuilder::new()
            .with_root(SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::required("id", PrimitiveType::Int64),
                    SchemaNode::optional("name", PrimitiveType::String),
                ],
            })
            .build()
            .unwrap();

        assert_eq!(schema.root.name(), "root");
        assert!(!schema.root.is_nullable());
        assert_eq!(schema.root.repetition(), Repetition::Required);
    }

    #[test]
    fn test_missing_root() {
        assert_eq!(
            SchemaBuilder::new().build().unwrap_err(),
            "Schema must have a root node"
        );
    }

    #[test]
    fn test_repetition_of_nodes() {
        let list = SchemaNode::repeated("tags", SchemaNode::required("element", PrimitiveType::String));
        assert_eq!(list.repetition(), Repetition::Repeated);
        assert_eq!(
            SchemaNode::optional("age", PrimitiveType::Int32).repetition(),
            Repetition::Optional
        );
        let embedded = SchemaNode::Embedded {
            name: "base".to_string(),
            fields: vec![SchemaNode::required("x", PrimitiveType::Int32)],
        };
        assert_eq!(embedded.repetition(), Repetition::Required);
    }

    #[test]
    fn test_primitive_matches() {
        assert!(PrimitiveType::UInt32.matches(&ParquetValue::UInt32(3)));
        assert!(!PrimitiveType::UInt32.matches(&ParquetValue::Int32(3)));
        assert!(PrimitiveType::String.matches(&ParquetValue::string("x")));
        assert!(!PrimitiveType::Boolean.matches(&ParquetValue::Null));
        assert_eq!(PrimitiveType::Float64.type_name(), "Float64");
    }
}
