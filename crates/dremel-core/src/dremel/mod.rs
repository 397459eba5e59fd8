//! Record shredding and assembly.
//!
//! [`shred`] flattens one record into a column's values and levels.
//! [`assemble`] is its mirror image: it consumes one record's worth of
//! values and levels and writes them back into a nested record.

mod assemble;
mod shred;

pub use assemble::{assemble, record_boundary, Consumed};
pub use shred::shred;

use crate::ParquetValue;

/// Flat buffers of one column.
///
/// `defs` only fills when the column's max definition level is above zero
/// and `reps` only when its max repetition level is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Levels {
    pub values: Vec<ParquetValue>,
    pub defs: Vec<i16>,
    pub reps: Vec<i16>,
}

impl Levels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all entries but keep the allocations
    pub fn clear(&mut self) {
        self.values.clear();
        self.defs.clear();
        self.reps.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.defs.is_empty() && self.reps.is_empty()
    }
}
