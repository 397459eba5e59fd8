//! Source generator for typed records.
//!
//! [`generate`] turns a schema into Rust source declaring one
//! [`parquet_record!`](crate::parquet_record) struct per group. The schema is
//! first lowered into a small AST by recursive descent, and the AST is
//! rendered as text.

use crate::{RecordError, Result};
use dremel_core::{camel_case, PrimitiveType, Reader, Schema, SchemaNode, SchemaTree};
use std::fmt;
use std::io::{Read, Seek};
use tracing::debug;

/// Type of one generated field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    /// A generated struct
    Named(String),
    Optional(Box<TypeExpr>),
    Repeated(Box<TypeExpr>),
}

/// One field of a generated struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Rust identifier of the field
    pub ident: String,
    /// Column name in the file
    pub column: String,
    pub ty: TypeExpr,
}

/// One generated struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// Output of [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    /// Name of the struct describing a whole row
    pub root_type: String,
    /// Declarations, row struct first, nested groups in schema order
    pub structs: Vec<StructDecl>,
    /// Rendered Rust source
    pub source: String,
}

/// Generate record declarations for `schema`, naming the row struct
/// `root_type`.
pub fn generate(schema: &Schema, root_type: &str) -> Result<SourceArtifact> {
    if !is_identifier(root_type) {
        return Err(RecordError::schema(format!(
            "'{root_type}' is not a valid type name"
        )));
    }
    // Reject shapes the runtime cannot shred before declaring anything
    SchemaTree::try_new(schema)?;

    let fields = match &schema.root {
        SchemaNode::Struct { fields, .. } => fields,
        other => {
            return Err(RecordError::schema(format!(
                "schema root must be a struct, found {}",
                other.name()
            )))
        }
    };

    let mut structs = Vec::new();
    declare_struct(root_type.to_string(), fields, &mut structs)?;

    let source = render(&structs);
    debug!(
        root_type,
        structs = structs.len(),
        "generated record declarations"
    );
    Ok(SourceArtifact {
        root_type: root_type.to_string(),
        structs,
        source,
    })
}

/// Generate record declarations for the schema stored in a file's footer
pub fn generate_from_file<R: Read + Seek>(source: R, root_type: &str) -> Result<SourceArtifact> {
    let reader = Reader::new(source)?;
    generate(reader.schema(), root_type)
}

fn declare_struct(name: String, fields: &[SchemaNode], out: &mut Vec<StructDecl>) -> Result<()> {
    // Reserve the slot so the parent precedes its children
    let slot = out.len();
    out.push(StructDecl {
        name: name.clone(),
        fields: Vec::new(),
    });

    let mut decls = Vec::new();
    collect_fields(fields, &mut decls, out)?;

    for (i, a) in decls.iter().enumerate() {
        if decls[..i].iter().any(|b| b.ident == a.ident) {
            return Err(RecordError::schema(format!(
                "columns of {name} map to the same field name '{}'",
                a.ident
            )));
        }
    }
    out[slot].fields = decls;
    Ok(())
}

fn collect_fields(
    fields: &[SchemaNode],
    decls: &mut Vec<FieldDecl>,
    out: &mut Vec<StructDecl>,
) -> Result<()> {
    for field in fields {
        match field {
            // embedded structs contribute their fields directly
            SchemaNode::Embedded { fields, .. } => collect_fields(fields, decls, out)?,
            _ => decls.push(FieldDecl {
                ident: field_ident(field.name()),
                column: field.name().to_string(),
                ty: type_expr(field, field.name(), out)?,
            }),
        }
    }
    Ok(())
}

/// Lower one schema node; `group` names the struct a group node becomes
fn type_expr(node: &SchemaNode, group: &str, out: &mut Vec<StructDecl>) -> Result<TypeExpr> {
    let ty = match node {
        SchemaNode::Primitive { primitive_type, .. } => TypeExpr::Primitive(*primitive_type),
        SchemaNode::Struct { fields, .. } => {
            let name = camel_case(group);
            if !is_identifier(&name) {
                return Err(RecordError::schema(format!(
                    "group '{group}' has no usable type name"
                )));
            }
            if out.iter().any(|s| s.name == name) {
                return Err(RecordError::schema(format!(
                    "more than one group is named {name}"
                )));
            }
            declare_struct(name.clone(), fields, out)?;
            TypeExpr::Named(name)
        }
        // items take the list's name
        SchemaNode::List { item, .. } => {
            TypeExpr::Repeated(Box::new(type_expr(item, group, out)?))
        }
        SchemaNode::Embedded { name, .. } => {
            return Err(RecordError::schema(format!(
                "embedded struct {name} cannot be a field type"
            )))
        }
    };
    Ok(if node.is_nullable() {
        TypeExpr::Optional(Box::new(ty))
    } else {
        ty
    })
}

fn render(structs: &[StructDecl]) -> String {
    let mut source = String::from(
        "// Code generated by dremel-record. DO NOT EDIT.\n\nuse dremel_record::parquet_record;\n",
    );
    for decl in structs {
        source.push('\n');
        source.push_str(&decl.to_string());
    }
    source
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(t) => f.write_str(rust_type(*t)),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Optional(inner) => write!(f, "Option<{inner}>"),
            TypeExpr::Repeated(inner) => write!(f, "Vec<{inner}>"),
        }
    }
}

impl fmt::Display for StructDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "parquet_record! {{")?;
        writeln!(f, "    #[derive(Debug, Clone, PartialEq)]")?;
        writeln!(f, "    pub struct {} {{", self.name)?;
        for field in &self.fields {
            writeln!(
                f,
                "        pub {}: {} => {:?},",
                field.ident, field.ty, field.column
            )?;
        }
        writeln!(f, "    }}")?;
        writeln!(f, "}}")
    }
}

fn rust_type(t: PrimitiveType) -> &'static str {
    match t {
        PrimitiveType::Int32 => "i32",
        PrimitiveType::UInt32 => "u32",
        PrimitiveType::Int64 => "i64",
        PrimitiveType::UInt64 => "u64",
        PrimitiveType::Float32 => "f32",
        PrimitiveType::Float64 => "f64",
        PrimitiveType::Boolean => "bool",
        PrimitiveType::String => "String",
    }
}

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Snake case Rust identifier for a column name
fn field_ident(column: &str) -> String {
    let mut ident = String::with_capacity(column.len() + 2);
    let mut prev_lower = false;
    for c in column.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower {
                ident.push('_');
            }
            ident.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !ident.is_empty() && !ident.ends_with('_') {
                ident.push('_');
            }
            prev_lower = false;
        }
    }
    let ident = ident.trim_end_matches('_');
    match ident {
        "" => "field".to_string(),
        // `self` and friends cannot be raw identifiers
        "self" | "super" | "crate" => format!("{ident}_"),
        _ if ident.starts_with(|c: char| c.is_ascii_digit()) => format!("_{ident}"),
        _ if KEYWORDS.contains(&ident) => format!("r#{ident}"),
        _ => ident.to_string(),
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}
