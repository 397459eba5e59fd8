use crate::column::ColumnDescriptor;
use crate::thrift_ext::format;
use crate::writer::TrackedWrite;
use crate::{ParquetValue, Result};
use std::io::{Read, Seek, Write};

/// Per-column page codec driven by the file writer and reader
///
/// One implementation instance owns the buffered values and levels of one
/// leaf column for the duration of a row group.
pub trait ColumnCodec {
    /// Path, physical type and repetition for footer construction
    fn descriptor(&self) -> ColumnDescriptor;

    /// Shred `record` into the buffers and update statistics
    fn add(&mut self, record: &ParquetValue);

    /// Write the buffered row group as a column chunk and register it in
    /// `columns`; buffers are cleared afterwards
    fn write<W: Write>(
        &mut self,
        sink: &mut TrackedWrite<W>,
        columns: &mut Vec<format::ColumnChunk>,
    ) -> Result<()>;

    /// Load every page of a column chunk into the buffers
    fn read<R: Read + Seek>(&mut self, source: &mut R, chunk: &format::ColumnChunk) -> Result<()>;

    /// Assemble the next buffered record into `record`
    fn scan(&mut self, record: &mut ParquetValue) -> Result<()>;

    /// Buffered `(defs, reps)`
    fn levels(&self) -> (&[i16], &[i16]);
}
