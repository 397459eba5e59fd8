use crate::column::{LeafColumn, Step, StepField};
use crate::{ParquetError, ParquetValue, Result};

/// How much of a column's buffers one record used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Consumed {
    pub values: usize,
    /// Level entries, counted once per `(def, rep)` pair
    pub levels: usize,
}

/// Number of level entries belonging to the first record in `reps`.
///
/// A record ends right before the next repetition level of zero.
pub fn record_boundary(reps: &[i16]) -> usize {
    match reps.first() {
        None => 0,
        Some(_) => reps[1..]
            .iter()
            .position(|&r| r == 0)
            .map_or(reps.len(), |p| p + 1),
    }
}

/// Write the next record of `column` into `record`.
///
/// `values`, `defs` and `reps` start at the column's read cursor; `defs` and
/// `reps` are ignored when the matching max level is zero. Containers are
/// created on demand, so columns may be assembled in any order into the
/// same record.
pub fn assemble(
    column: &LeafColumn,
    record: &mut ParquetValue,
    values: &[ParquetValue],
    defs: &[i16],
    reps: &[i16],
) -> Result<Consumed> {
    let max_def = column.max_definition_level();
    let max_rep = column.max_repetition_level();

    let entries = if max_rep == 0 {
        1
    } else {
        record_boundary(reps)
    };
    if entries == 0 {
        return Err(ParquetError::encoding(format!(
            "repetition levels exhausted for `{}`",
            column.name()
        )));
    }
    if max_def > 0 && defs.len() < entries {
        return Err(ParquetError::encoding(format!(
            "definition levels exhausted for `{}`",
            column.name()
        )));
    }

    let mut assembler = Assembler {
        column,
        values,
        consumed: 0,
        indices: vec![0; max_rep as usize],
    };
    for i in 0..entries {
        let def = if max_def > 0 { defs[i] } else { 0 };
        if i > 0 {
            assembler.advance(reps[i])?;
        }
        assembler.place(record, def)?;
    }

    Ok(Consumed {
        values: assembler.consumed,
        levels: entries,
    })
}

struct Assembler<'a> {
    column: &'a LeafColumn,
    values: &'a [ParquetValue],
    consumed: usize,
    /// Current element index of every repeated ancestor, outermost first
    indices: Vec<usize>,
}

impl Assembler<'_> {
    /// A new element starts in the repeated ancestor at level `rep`; every
    /// deeper ancestor restarts at its first element.
    fn advance(&mut self, rep: i16) -> Result<()> {
        let depth = rep as usize;
        if depth == 0 || depth > self.indices.len() {
            return Err(ParquetError::encoding(format!(
                "repetition level {} out of range for `{}`",
                rep,
                self.column.name()
            )));
        }
        self.indices[depth - 1] += 1;
        for index in &mut self.indices[depth..] {
            *index = 0;
        }
        Ok(())
    }

    /// Create the path for one level entry and assign its value when the
    /// definition level says one is present.
    fn place(&mut self, record: &mut ParquetValue, def: i16) -> Result<()> {
        let column = self.column;
        let mut current = record;
        let mut defined = 0;
        let mut repeated = 0;

        for step in &column.steps {
            match step {
                Step::Required(run) => {
                    for field in run {
                        current = self.slot(current, field, ParquetValue::Null)?;
                        if let (Some(skeleton), true) = (&field.skeleton, current.is_null()) {
                            *current = skeleton.clone();
                        }
                    }
                }
                Step::Optional(field) => {
                    let slot = self.slot(current, field, ParquetValue::Null)?;
                    if def <= defined {
                        *slot = ParquetValue::Null;
                        return Ok(());
                    }
                    defined += 1;
                    if let (Some(skeleton), true) = (&field.skeleton, slot.is_null()) {
                        *slot = skeleton.clone();
                    }
                    current = slot;
                }
                Step::Repeated { field, .. } => {
                    let slot = self.slot(current, field, ParquetValue::List(Vec::new()))?;
                    if !matches!(slot, ParquetValue::List(_)) {
                        *slot = ParquetValue::List(Vec::new());
                    }
                    let ParquetValue::List(items) = slot else {
                        return Err(ParquetError::internal("list slot was not a list"));
                    };
                    if def <= defined {
                        return Ok(());
                    }
                    defined += 1;

                    let index = self.indices[repeated];
                    repeated += 1;
                    if index == items.len() {
                        items.push(field.skeleton.clone().unwrap_or(ParquetValue::Null));
                    } else if index > items.len() {
                        return Err(ParquetError::encoding(format!(
                            "element {} of `{}` skips past the end of a list of {}",
                            index,
                            column.name(),
                            items.len()
                        )));
                    }
                    current = &mut items[index];
                }
            }
        }

        if def != column.max_definition_level() {
            return Err(ParquetError::encoding(format!(
                "definition level {} out of range for `{}`",
                def,
                column.name()
            )));
        }
        let value = self.values.get(self.consumed).ok_or_else(|| {
            ParquetError::encoding(format!("values exhausted for `{}`", column.name()))
        })?;
        *current = value.clone();
        self.consumed += 1;
        Ok(())
    }

    /// The field slot inside record `parent`, inserted with `default` when
    /// missing
    fn slot<'r>(
        &self,
        parent: &'r mut ParquetValue,
        field: &StepField,
        default: ParquetValue,
    ) -> Result<&'r mut ParquetValue> {
        let type_name = parent.type_name();
        let fields = parent.as_record_mut().ok_or_else(|| {
            ParquetError::data_validation(format!(
                "cannot assemble `{}` into a {} value",
                self.column.name(),
                type_name
            ))
        })?;
        Ok(fields.entry(field.name.clone()).or_insert(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::resolve_columns;
    use crate::dremel::{shred, Levels};
    use crate::tree::SchemaTree;
    use crate::{PrimitiveType, Schema, SchemaNode};

    fn columns_of(fields: Vec<SchemaNode>) -> (SchemaTree, Vec<LeafColumn>) {
        let tree = SchemaTree::try_new(&Schema {
            root: SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields,
            },
        })
        .unwrap();
        let columns = resolve_columns(&tree);
        (tree, columns)
    }

    #[test]
    fn test_record_boundary() {
        assert_eq!(record_boundary(&[]), 0);
        assert_eq!(record_boundary(&[0]), 1);
        assert_eq!(record_boundary(&[0, 2, 1, 1, 0]), 4);
        assert_eq!(record_boundary(&[0, 0, 1]), 1);
        assert_eq!(record_boundary(&[0, 1, 1]), 3);
    }

    #[test]
    fn test_required_column_takes_one_value() {
        let (tree, columns) = columns_of(vec![SchemaNode::required("id", PrimitiveType::Int32)]);
        let mut record = tree.skeleton(tree.root());
        let values = [ParquetValue::Int32(1), ParquetValue::Int32(2)];
        let consumed = assemble(&columns[0], &mut record, &values, &[], &[]).unwrap();
        assert_eq!(consumed, Consumed { values: 1, levels: 1 });
        assert_eq!(record, ParquetValue::record([("id", ParquetValue::Int32(1))]));
    }

    #[test]
    fn test_assemble_into_empty_record() {
        let (_, columns) = columns_of(vec![SchemaNode::Struct {
            name: "inner".to_string(),
            nullable: false,
            fields: vec![
                SchemaNode::repeated("xs", SchemaNode::required("element", PrimitiveType::Int32)),
                SchemaNode::optional("y", PrimitiveType::Boolean),
            ],
        }]);

        let mut record = ParquetValue::record(Vec::<(&str, ParquetValue)>::new());
        let values = [ParquetValue::Int32(4), ParquetValue::Int32(5)];
        let consumed = assemble(&columns[0], &mut record, &values, &[1, 1], &[0, 1]).unwrap();
        assert_eq!(consumed, Consumed { values: 2, levels: 2 });
        assert_eq!(
            record,
            ParquetValue::record([(
                "inner",
                ParquetValue::record([
                    ("xs", ParquetValue::List(vec![ParquetValue::Int32(4), ParquetValue::Int32(5)])),
                    ("y", ParquetValue::Null),
                ]),
            )])
        );
    }

    #[test]
    fn test_absent_parent_is_not_an_empty_list() {
        let (tree, columns) = columns_of(vec![SchemaNode::Struct {
            name: "outer".to_string(),
            nullable: true,
            fields: vec![SchemaNode::repeated(
                "xs",
                SchemaNode::required("element", PrimitiveType::Int64),
            )],
        }]);
        let xs = &columns[0];

        let mut absent = tree.skeleton(tree.root());
        assemble(xs, &mut absent, &[], &[0], &[0]).unwrap();
        assert_eq!(absent, ParquetValue::record([("outer", ParquetValue::Null)]));

        let mut empty = tree.skeleton(tree.root());
        assemble(xs, &mut empty, &[], &[1], &[0]).unwrap();
        assert_eq!(
            empty,
            ParquetValue::record([(
                "outer",
                ParquetValue::record([("xs", ParquetValue::List(vec![]))])
            )])
        );
    }

    #[test]
    fn test_deep_mixed_nesting_round_trip() {
        // a: repeated { b: optional { c: repeated { d: optional int32 } } }
        let (tree, columns) = columns_of(vec![SchemaNode::repeated(
            "a",
            SchemaNode::Struct {
                name: "element".to_string(),
                nullable: false,
                fields: vec![SchemaNode::Struct {
                    name: "b".to_string(),
                    nullable: true,
                    fields: vec![SchemaNode::repeated(
                        "c",
                        SchemaNode::Struct {
                            name: "element".to_string(),
                            nullable: false,
                            fields: vec![SchemaNode::optional("d", PrimitiveType::Int32)],
                        },
                    )],
                }],
            },
        )]);
        let d = &columns[0];
        assert_eq!(d.max_definition_level(), 4);
        assert_eq!(d.max_repetition_level(), 2);

        let c = |d: Option<i32>| {
            ParquetValue::record([("d", d.map_or(ParquetValue::Null, ParquetValue::Int32))])
        };
        let a = |b: Option<Vec<ParquetValue>>| {
            ParquetValue::record([(
                "b",
                b.map_or(ParquetValue::Null, |cs| {
                    ParquetValue::record([("c", ParquetValue::List(cs))])
                }),
            )])
        };
        let records = vec![
            ParquetValue::record([(
                "a",
                ParquetValue::List(vec![
                    a(Some(vec![c(Some(1)), c(None), c(Some(3))])),
                    a(None),
                    a(Some(vec![])),
                    a(Some(vec![c(None)])),
                ]),
            )]),
            ParquetValue::record([("a", ParquetValue::List(vec![]))]),
            ParquetValue::record([("a", ParquetValue::List(vec![a(Some(vec![c(Some(9))]))]))]),
        ];

        let mut levels = Levels::new();
        for record in &records {
            shred(d, record, &mut levels);
        }
        assert_eq!(levels.defs, vec![4, 3, 4, 1, 2, 3, 0, 4]);
        assert_eq!(levels.reps, vec![0, 2, 2, 1, 1, 1, 0, 0]);

        let (mut value_pos, mut level_pos) = (0, 0);
        for expected in &records {
            let mut record = tree.skeleton(tree.root());
            let consumed = assemble(
                d,
                &mut record,
                &levels.values[value_pos..],
                &levels.defs[level_pos..],
                &levels.reps[level_pos..],
            )
            .unwrap();
            value_pos += consumed.values;
            level_pos += consumed.levels;
            assert_eq!(&record, expected);
        }
        assert_eq!(value_pos, levels.values.len());
        assert_eq!(level_pos, levels.defs.len());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "values exhausted"))]
    fn test_missing_values_are_an_encoding_error() {
        let (tree, columns) = columns_of(vec![SchemaNode::optional("x", PrimitiveType::Int32)]);
        let mut record = tree.skeleton(tree.root());
        let err = assemble(&columns[0], &mut record, &[], &[1], &[]).unwrap_err();
        assert!(matches!(err, ParquetError::Encoding(_)));
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "skips past the end"))]
    fn test_index_jump_is_an_encoding_error() {
        let (tree, columns) = columns_of(vec![SchemaNode::repeated(
            "outer",
            SchemaNode::Struct {
                name: "element".to_string(),
                nullable: false,
                fields: vec![SchemaNode::repeated(
                    "inner",
                    SchemaNode::required("element", PrimitiveType::Int32),
                )],
            },
        )]);
        let mut record = tree.skeleton(tree.root());
        // An empty outer list followed by a value inside its second element
        let values = [ParquetValue::Int32(1)];
        let err = assemble(&columns[0], &mut record, &values, &[0, 2], &[0, 1]).unwrap_err();
        assert!(matches!(err, ParquetError::Encoding(_)));
    }
}
