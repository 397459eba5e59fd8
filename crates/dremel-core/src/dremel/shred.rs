use super::Levels;
use crate::column::{LeafColumn, Step};
use crate::ParquetValue;

/// Append one record's values and levels for `column` to `out`.
///
/// Total over any input: a missing field or a value of the wrong shape
/// where a container is expected ends the walk as an absent ancestor.
/// Recursion depth is bounded by the number of steps in the column plan.
pub fn shred(column: &LeafColumn, record: &ParquetValue, out: &mut Levels) {
    Shredder { column, out }.walk(&column.steps, record, 0, 0);
}

struct Shredder<'a> {
    column: &'a LeafColumn,
    out: &'a mut Levels,
}

impl Shredder<'_> {
    fn walk(&mut self, steps: &[Step], value: &ParquetValue, def: i16, rep: i16) {
        let Some((step, rest)) = steps.split_first() else {
            if value.is_null() {
                self.emit_absent(def, rep);
            } else {
                self.emit_value(value, rep);
            }
            return;
        };

        match step {
            Step::Required(run) => {
                let mut current = value;
                for field in run {
                    match current.field(&field.name) {
                        Some(next) => current = next,
                        None => return self.emit_absent(def, rep),
                    }
                }
                self.walk(rest, current, def, rep);
            }
            Step::Optional(field) => match current_field(value, &field.name) {
                Some(next) => self.walk(rest, next, def + 1, rep),
                None => self.emit_absent(def, rep),
            },
            Step::Repeated { field, level } => {
                let items = current_field(value, &field.name)
                    .and_then(ParquetValue::as_list)
                    .unwrap_or_default();
                if items.is_empty() {
                    return self.emit_absent(def, rep);
                }
                for (i, item) in items.iter().enumerate() {
                    // Only the first element inherits the enclosing level
                    let rep = if i == 0 { rep } else { *level };
                    self.walk(rest, item, def + 1, rep);
                }
            }
        }
    }

    fn emit_value(&mut self, value: &ParquetValue, rep: i16) {
        self.out.values.push(value.clone());
        self.push_levels(self.column.max_definition_level(), rep);
    }

    fn emit_absent(&mut self, def: i16, rep: i16) {
        self.push_levels(def, rep);
    }

    fn push_levels(&mut self, def: i16, rep: i16) {
        if self.column.max_definition_level() > 0 {
            self.out.defs.push(def);
        }
        if self.column.max_repetition_level() > 0 {
            self.out.reps.push(rep);
        }
    }
}

/// The named field of a record, or `None` when absent or null
fn current_field<'v>(value: &'v ParquetValue, name: &str) -> Option<&'v ParquetValue> {
    value.field(name).filter(|v| !v.is_null())
}
