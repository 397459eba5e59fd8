//! Arena form of a declared schema.
//!
//! [`SchemaTree`] flattens a [`Schema`] into index-addressed nodes. Embedded
//! structs are inlined, lists become repeated nodes, and every node records
//! its parent index. All unsupported shapes are rejected here, so nothing
//! downstream has to re-check them.

use crate::{ParquetError, ParquetValue, PrimitiveType, Repetition, Result, Schema, SchemaNode};
use std::collections::HashSet;
use std::sync::Arc;

/// Index of a node inside a [`SchemaTree`]
pub type NodeId = usize;

/// One field of the schema tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    name: Arc<str>,
    repetition: Repetition,
    primitive_type: Option<PrimitiveType>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// Set for leaves, `None` for structs
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        self.primitive_type
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.primitive_type.is_some()
    }

    pub(crate) fn name_arc(&self) -> &Arc<str> {
        &self.name
    }
}

/// Immutable arena of schema nodes; node 0 is the root struct
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTree {
    nodes: Vec<TreeNode>,
}

const ROOT: NodeId = 0;

impl SchemaTree {
    /// Compile a declared schema, rejecting every shape the column engine
    /// cannot represent.
    pub fn try_new(schema: &Schema) -> Result<Self> {
        let (name, fields) = match &schema.root {
            SchemaNode::Struct {
                nullable: true, ..
            } => return Err(ParquetError::schema("root struct cannot be nullable")),
            SchemaNode::Struct { name, fields, .. } => (name, fields),
            other => {
                return Err(ParquetError::schema(format!(
                    "root must be a struct, found `{}`",
                    other.name()
                )))
            }
        };

        let mut tree = SchemaTree {
            nodes: vec![TreeNode {
                name: Arc::from(name.as_str()),
                repetition: Repetition::Required,
                primitive_type: None,
                children: Vec::new(),
                parent: None,
            }],
        };
        tree.add_fields(ROOT, fields)?;
        tree.check_struct(ROOT)?;
        Ok(tree)
    }

    fn push(
        &mut self,
        parent: NodeId,
        name: &str,
        repetition: Repetition,
        primitive_type: Option<PrimitiveType>,
    ) -> Result<NodeId> {
        if name.is_empty() {
            return Err(ParquetError::schema(format!(
                "field of `{}` has an empty name",
                self.display_path(parent)
            )));
        }
        if self.nodes[parent]
            .children
            .iter()
            .any(|&c| self.nodes[c].name() == name)
        {
            return Err(ParquetError::schema(format!(
                "duplicate field `{}` in `{}`",
                name,
                self.display_path(parent)
            )));
        }

        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            name: Arc::from(name),
            repetition,
            primitive_type,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].children.push(id);
        Ok(id)
    }

    fn add_fields(&mut self, parent: NodeId, fields: &[SchemaNode]) -> Result<()> {
        for field in fields {
            self.add_field(parent, field)?;
        }
        Ok(())
    }

    fn add_field(&mut self, parent: NodeId, field: &SchemaNode) -> Result<()> {
        match field {
            SchemaNode::Embedded { fields, .. } => self.add_fields(parent, fields),
            SchemaNode::Struct {
                name,
                nullable,
                fields,
            } => {
                let repetition = if *nullable {
                    Repetition::Optional
                } else {
                    Repetition::Required
                };
                let id = self.push(parent, name, repetition, None)?;
                self.add_fields(id, fields)?;
                self.check_struct(id)
            }
            SchemaNode::Primitive {
                name,
                primitive_type,
                nullable,
            } => {
                let repetition = if *nullable {
                    Repetition::Optional
                } else {
                    Repetition::Required
                };
                self.push(parent, name, repetition, Some(*primitive_type))
                    .map(|_| ())
            }
            SchemaNode::List {
                name,
                nullable,
                item,
            } => {
                if *nullable {
                    return Err(ParquetError::unsupported(format!(
                        "list `{name}` cannot be nullable, use an empty list instead"
                    )));
                }
                if item.is_nullable() {
                    return Err(ParquetError::unsupported(format!(
                        "list `{name}` cannot hold nullable items"
                    )));
                }
                match item.as_ref() {
                    SchemaNode::List { .. } => Err(ParquetError::unsupported(format!(
                        "list `{name}` holds lists directly, wrap the inner list in a struct"
                    ))),
                    SchemaNode::Embedded { .. } => Err(ParquetError::unsupported(format!(
                        "list `{name}` cannot hold an embedded struct"
                    ))),
                    SchemaNode::Struct { fields, .. } => {
                        let id = self.push(parent, name, Repetition::Repeated, None)?;
                        self.add_fields(id, fields)?;
                        self.check_struct(id)
                    }
                    SchemaNode::Primitive { primitive_type, .. } => self
                        .push(parent, name, Repetition::Repeated, Some(*primitive_type))
                        .map(|_| ()),
                }
            }
        }
    }

    fn check_struct(&self, id: NodeId) -> Result<()> {
        if self.nodes[id].children.is_empty() {
            return Err(ParquetError::schema(format!(
                "struct `{}` has no fields",
                self.display_path(id)
            )));
        }
        Ok(())
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    /// Nodes from the top-most child of the root down to and including `id`
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ROOT {
                break;
            }
            chain.push(node);
            current = self.nodes[node].parent;
        }
        chain.reverse();
        chain
    }

    /// Number of optional or repeated nodes on the path to `id`
    pub fn max_definition_level(&self, id: NodeId) -> i16 {
        self.ancestors(id)
            .into_iter()
            .filter(|&n| self.nodes[n].repetition != Repetition::Required)
            .count() as i16
    }

    /// Number of repeated nodes on the path to `id`
    pub fn max_repetition_level(&self, id: NodeId) -> i16 {
        self.ancestors(id)
            .into_iter()
            .filter(|&n| self.nodes[n].repetition == Repetition::Repeated)
            .count() as i16
    }

    /// Field names from the root to `id`, root excluded
    pub fn path(&self, id: NodeId) -> Vec<Arc<str>> {
        self.ancestors(id)
            .into_iter()
            .map(|n| self.nodes[n].name.clone())
            .collect()
    }

    fn display_path(&self, id: NodeId) -> String {
        if id == ROOT {
            return self.nodes[ROOT].name.to_string();
        }
        self.path(id).join(".")
    }

    /// Leaf nodes in depth-first, child order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![ROOT];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// An empty container for struct node `id`.
    ///
    /// Optional children start as `Null`, repeated children as empty lists,
    /// required structs recursively as skeletons and required primitives as
    /// `Null` placeholders until a column fills them in.
    pub fn skeleton(&self, id: NodeId) -> ParquetValue {
        ParquetValue::Record(
            self.nodes[id]
                .children
                .iter()
                .map(|&child| {
                    let node = &self.nodes[child];
                    let value = match node.repetition {
                        Repetition::Repeated => ParquetValue::List(Vec::new()),
                        Repetition::Optional => ParquetValue::Null,
                        Repetition::Required if node.is_leaf() => ParquetValue::Null,
                        Repetition::Required => self.skeleton(child),
                    };
                    (node.name.clone(), value)
                })
                .collect(),
        )
    }

    /// Check that `record` has the shape this tree describes.
    ///
    /// Missing optional fields count as `Null` and missing repeated fields
    /// as empty lists. Unknown fields are rejected.
    pub fn validate(&self, record: &ParquetValue) -> Result<()> {
        self.validate_struct(ROOT, record)
    }

    fn validate_struct(&self, id: NodeId, value: &ParquetValue) -> Result<()> {
        let fields = value.as_record().ok_or_else(|| {
            ParquetError::data_validation(format!(
                "`{}` expects a record, found {}",
                self.display_path(id),
                value.type_name()
            ))
        })?;

        let known: HashSet<&str> = self.nodes[id]
            .children
            .iter()
            .map(|&c| self.nodes[c].name())
            .collect();
        if let Some(unknown) = fields.keys().find(|k| !known.contains(k.as_ref())) {
            return Err(ParquetError::data_validation(format!(
                "`{}` has no field named `{}`",
                self.display_path(id),
                unknown
            )));
        }

        for &child in &self.nodes[id].children {
            let node = &self.nodes[child];
            match (node.repetition, fields.get(node.name())) {
                (Repetition::Required, None | Some(ParquetValue::Null)) => {
                    return Err(ParquetError::data_validation(format!(
                        "required field `{}` is missing",
                        self.display_path(child)
                    )))
                }
                (Repetition::Optional, None | Some(ParquetValue::Null)) => {}
                (Repetition::Repeated, None) => {}
                (Repetition::Repeated, Some(ParquetValue::List(items))) => {
                    for item in items {
                        self.validate_value(child, item)?;
                    }
                }
                (Repetition::Repeated, Some(other)) => {
                    return Err(ParquetError::data_validation(format!(
                        "repeated field `{}` expects a list, found {}",
                        self.display_path(child),
                        other.type_name()
                    )))
                }
                (_, Some(value)) => self.validate_value(child, value)?,
            }
        }
        Ok(())
    }

    fn validate_value(&self, id: NodeId, value: &ParquetValue) -> Result<()> {
        match self.nodes[id].primitive_type {
            None => self.validate_struct(id, value),
            Some(primitive_type) if primitive_type.matches(value) => Ok(()),
            Some(primitive_type) => Err(ParquetError::data_validation(format!(
                "`{}` expects {}, found {}",
                self.display_path(id),
                primitive_type.type_name(),
                value.type_name()
            ))),
        }
    }
}
