//! Leaf columns derived from a [`SchemaTree`].
//!
//! Each [`LeafColumn`] carries its path, the repetition of every field on
//! that path, its maximum levels and a compiled access plan shared by the
//! shredder and the assembler.

use crate::naming::camel_case;
use crate::tree::{NodeId, SchemaTree};
use crate::{ParquetValue, PrimitiveType, Repetition};
use std::sync::Arc;

/// A field visited by an access plan.
///
/// `skeleton` is the empty container created when the field is a struct
/// that does not exist yet; leaves have none.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StepField {
    pub(crate) name: Arc<str>,
    pub(crate) skeleton: Option<ParquetValue>,
}

/// One branch point on the way from the root to a leaf
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Step {
    /// A maximal run of required fields, walked without branching
    Required(Vec<StepField>),
    /// An optional field that adds one definition level when present
    Optional(StepField),
    /// A repeated field; `level` is its repetition level
    Repeated { field: StepField, level: i16 },
}

/// What the footer needs to know about a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub path: Vec<Arc<str>>,
    pub primitive_type: PrimitiveType,
    pub repetition: Repetition,
    pub max_def_level: i16,
    pub max_rep_level: i16,
}

/// A primitive column and everything needed to shred or assemble it
#[derive(Debug, Clone, PartialEq)]
pub struct LeafColumn {
    node: NodeId,
    path: Vec<Arc<str>>,
    repetitions: Vec<Repetition>,
    max_def: i16,
    max_rep: i16,
    primitive_type: PrimitiveType,
    pub(crate) steps: Vec<Step>,
}

impl LeafColumn {
    fn new(tree: &SchemaTree, leaf: NodeId) -> Option<Self> {
        let primitive_type = tree.node(leaf).primitive_type()?;
        let ancestors = tree.ancestors(leaf);

        let mut steps: Vec<Step> = Vec::new();
        let mut level = 0;
        for &id in &ancestors {
            let node = tree.node(id);
            let field = StepField {
                name: node.name_arc().clone(),
                skeleton: (!node.is_leaf()).then(|| tree.skeleton(id)),
            };
            match node.repetition() {
                Repetition::Required => match steps.last_mut() {
                    Some(Step::Required(run)) => run.push(field),
                    _ => steps.push(Step::Required(vec![field])),
                },
                Repetition::Optional => steps.push(Step::Optional(field)),
                Repetition::Repeated => {
                    level += 1;
                    steps.push(Step::Repeated { field, level });
                }
            }
        }

        Some(LeafColumn {
            node: leaf,
            path: tree.path(leaf),
            repetitions: ancestors
                .iter()
                .map(|&id| tree.node(id).repetition())
                .collect(),
            max_def: tree.max_definition_level(leaf),
            max_rep: tree.max_repetition_level(leaf),
            primitive_type,
            steps,
        })
    }

    /// Node of the leaf inside the tree it was resolved from
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Field names from the root to the leaf, root excluded
    pub fn path(&self) -> &[Arc<str>] {
        &self.path
    }

    /// Dot-joined path
    pub fn name(&self) -> String {
        self.path.join(".")
    }

    /// Repetition of every field from the top-most child of the root down
    /// to and including the leaf
    pub fn repetitions(&self) -> &[Repetition] {
        &self.repetitions
    }

    pub fn max_definition_level(&self) -> i16 {
        self.max_def
    }

    pub fn max_repetition_level(&self) -> i16 {
        self.max_rep
    }

    pub fn primitive_type(&self) -> PrimitiveType {
        self.primitive_type
    }

    /// Repetition of the leaf itself
    pub fn repetition(&self) -> Repetition {
        self.repetitions
            .last()
            .copied()
            .unwrap_or(Repetition::Required)
    }

    /// Definition level reached by each repeated field on the path, indexed
    /// by repetition level minus one
    pub fn repeated_definition_levels(&self) -> Vec<i16> {
        let mut def = 0;
        let mut levels = Vec::with_capacity(self.max_rep.max(0) as usize);
        for repetition in &self.repetitions {
            match repetition {
                Repetition::Required => {}
                Repetition::Optional => def += 1,
                Repetition::Repeated => {
                    def += 1;
                    levels.push(def);
                }
            }
        }
        levels
    }

    /// Exported accessor name, e.g. `NamesLanguagesCode`
    pub fn accessor_name(&self) -> String {
        self.path.iter().map(|p| camel_case(p)).collect()
    }

    pub fn descriptor(&self) -> ColumnDescriptor {
        ColumnDescriptor {
            path: self.path.clone(),
            primitive_type: self.primitive_type,
            repetition: self.repetition(),
            max_def_level: self.max_def,
            max_rep_level: self.max_rep,
        }
    }
}

/// Leaf columns of `tree` in depth-first, child order
pub fn resolve_columns(tree: &SchemaTree) -> Vec<LeafColumn> {
    tree.leaves()
        .into_iter()
        .filter_map(|leaf| LeafColumn::new(tree, leaf))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::document_schema;
    use crate::{Schema, SchemaNode};

    fn document_columns() -> Vec<LeafColumn> {
        resolve_columns(&SchemaTree::try_new(&document_schema()).unwrap())
    }

    #[test]
    fn test_resolve_document_columns() {
        let columns = document_columns();
        let names: Vec<String> = columns.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "docid",
                "links.backward",
                "links.forward",
                "names.languages.code",
                "names.languages.country",
                "names.url",
            ]
        );

        let country = &columns[4];
        assert_eq!(
            country.repetitions(),
            &[Repetition::Repeated, Repetition::Repeated, Repetition::Optional]
        );
        assert_eq!(country.max_definition_level(), 3);
        assert_eq!(country.max_repetition_level(), 2);
        assert_eq!(country.primitive_type(), PrimitiveType::String);
        assert_eq!(country.accessor_name(), "NamesLanguagesCountry");

        for column in &columns {
            assert!(column.max_definition_level() >= column.max_repetition_level());
            assert!(column.repetitions().len() as i16 >= column.max_definition_level());
        }
    }

    #[test]
    fn test_required_runs_collapse() {
        let schema = Schema {
            root: SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![SchemaNode::Struct {
                    name: "a".to_string(),
                    nullable: false,
                    fields: vec![SchemaNode::Struct {
                        name: "b".to_string(),
                        nullable: true,
                        fields: vec![SchemaNode::Struct {
                            name: "c".to_string(),
                            nullable: false,
                            fields: vec![SchemaNode::required("d", PrimitiveType::Int32)],
                        }],
                    }],
                }],
            },
        };
        let columns = resolve_columns(&SchemaTree::try_new(&schema).unwrap());
        let steps = &columns[0].steps;
        assert_eq!(steps.len(), 3);
        assert!(matches!(&steps[0], Step::Required(run) if run.len() == 1));
        assert!(matches!(&steps[1], Step::Optional(f) if f.name.as_ref() == "b"));
        assert!(matches!(&steps[2], Step::Required(run) if run.len() == 2 && run[1].skeleton.is_none()));
    }

    #[test]
    fn test_repeated_definition_levels() {
        let columns = document_columns();
        let levels: Vec<Vec<i16>> = columns
            .iter()
            .map(|c| c.repeated_definition_levels())
            .collect();
        assert_eq!(
            levels,
            vec![vec![], vec![2], vec![2], vec![1, 2], vec![1, 2], vec![1]]
        );
        for column in &columns {
            assert_eq!(
                column.repeated_definition_levels().len() as i16,
                column.max_repetition_level()
            );
        }
    }

    #[test]
    fn test_descriptor() {
        let columns = document_columns();
        let backward = columns[1].descriptor();
        assert_eq!(backward.repetition, Repetition::Repeated);
        assert_eq!(backward.max_def_level, 2);
        assert_eq!(backward.max_rep_level, 1);
        assert_eq!(
            backward.path.iter().map(|p| p.as_ref()).collect::<Vec<_>>(),
            vec!["links", "backward"]
        );
        assert_eq!(columns[0].descriptor().repetition, Repetition::Required);
    }
}
