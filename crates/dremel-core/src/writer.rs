//! Core Parquet writing functionality

use crate::chunk::ColumnChunk;
use crate::column::{resolve_columns, LeafColumn};
use crate::compression::Compression;
use crate::metadata::schema_to_elements;
use crate::thrift_ext::format::{self, FileMetaData, KeyValue};
use crate::thrift_ext::serialize;
use crate::traits::ColumnCodec;
use crate::tree::SchemaTree;
use crate::{ErrorContext, ParquetError, ParquetValue, Result, Schema};
use std::io::Write;
use tracing::debug;

/// Magic bytes at the start and end of every file
pub const MAGIC: &[u8; 4] = b"PAR1";

/// Records buffered per row group unless configured otherwise
pub const DEFAULT_ROW_GROUP_SIZE: usize = 1000;

const FORMAT_VERSION: i32 = 1;

/// A sink that counts the bytes written through it
#[derive(Debug)]
pub struct TrackedWrite<W> {
    inner: W,
    bytes_written: usize,
}

impl<W: Write> TrackedWrite<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            bytes_written: 0,
        }
    }

    /// Offset the next write lands at
    pub fn bytes_written(&self) -> usize {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for TrackedWrite<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes_written += written;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Builder for creating a configured Writer
#[derive(Debug, Clone)]
pub struct WriterBuilder {
    compression: Compression,
    column_compression: Vec<(String, Compression)>,
    row_group_size: usize,
    created_by: String,
    key_value_metadata: Vec<(String, Option<String>)>,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            column_compression: Vec::new(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            created_by: format!("dremel-core version {}", env!("CARGO_PKG_VERSION")),
            key_value_metadata: Vec::new(),
        }
    }
}

impl WriterBuilder {
    /// Create a new WriterBuilder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page compression codec
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Compress the column at the dot-joined `path`, e.g.
    /// `names.languages.code`, with `compression` instead of the default
    /// codec. The last setting for a path wins.
    pub fn with_column_compression(
        mut self,
        path: impl Into<String>,
        compression: Compression,
    ) -> Self {
        self.column_compression.push((path.into(), compression));
        self
    }

    /// Set the number of records per row group; at least one
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size.max(1);
        self
    }

    /// Set the application name recorded in the footer
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Add a key/value pair to the footer metadata
    pub fn with_key_value_metadata(
        mut self,
        key: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        self.key_value_metadata.push((key.into(), value));
        self
    }

    /// Build a Writer with the configured settings.
    ///
    /// The schema is compiled here; unsupported shapes fail before any
    /// byte reaches the sink.
    pub fn build<W: Write>(self, sink: W, schema: Schema) -> Result<Writer<W>> {
        let tree = SchemaTree::try_new(&schema)?;
        let columns = resolve_columns(&tree);
        if let Some((path, _)) = self
            .column_compression
            .iter()
            .find(|(path, _)| !columns.iter().any(|c| c.name() == *path))
        {
            return Err(ParquetError::invalid_argument(format!(
                "compression set for unknown column `{path}`"
            )));
        }
        let chunks = columns
            .into_iter()
            .map(|column| {
                let compression = self
                    .column_compression
                    .iter()
                    .rev()
                    .find(|(path, _)| column.name() == *path)
                    .map_or(self.compression, |&(_, compression)| compression);
                ColumnChunk::new(column, compression)
            })
            .collect();

        let mut sink = TrackedWrite::new(sink);
        sink.write_all(MAGIC)?;

        Ok(Writer {
            sink,
            schema,
            tree,
            chunks,
            row_groups: Vec::new(),
            buffered_rows: 0,
            total_rows: 0,
            poisoned: false,
            config: self,
        })
    }
}

/// Writer of records into a single file
pub struct Writer<W: Write> {
    sink: TrackedWrite<W>,
    schema: Schema,
    tree: SchemaTree,
    chunks: Vec<ColumnChunk>,
    row_groups: Vec<format::RowGroup>,
    buffered_rows: usize,
    total_rows: usize,
    poisoned: bool,
    config: WriterBuilder,
}

impl<W: Write> Writer<W> {
    /// Create a new writer with default settings
    pub fn new(sink: W, schema: Schema) -> Result<Self> {
        WriterBuilder::new().build(sink, schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Leaf columns in file order
    pub fn columns(&self) -> impl Iterator<Item = &LeafColumn> {
        self.chunks.iter().map(|c| c.column())
    }

    /// Write a batch of records
    pub fn write_rows<I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = ParquetValue>,
    {
        for record in records {
            self.write_row(record)?;
        }
        Ok(())
    }

    /// Write a single record.
    ///
    /// The record is checked against the schema before any column sees it,
    /// so a rejected record leaves the buffers untouched. A row group is
    /// flushed once the configured number of records is buffered.
    pub fn write_row(&mut self, record: ParquetValue) -> Result<()> {
        self.check_poisoned()?;
        self.tree.validate(&record)?;

        for chunk in &mut self.chunks {
            chunk.add(&record);
        }
        self.buffered_rows += 1;

        if self.buffered_rows >= self.config.row_group_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Write the buffered records as one row group.
    ///
    /// Columns are written in order and the first failure aborts the row
    /// group; the writer refuses any further work afterwards.
    pub fn flush(&mut self) -> Result<()> {
        self.check_poisoned()?;
        if self.buffered_rows == 0 {
            return Ok(());
        }

        let start = self.sink.bytes_written();
        let mut columns = Vec::with_capacity(self.chunks.len());
        let row_group = self.row_groups.len();
        for chunk in &mut self.chunks {
            let written = chunk
                .write(&mut self.sink, &mut columns)
                .with_context(|| format!("writing row group {row_group}"));
            if written.is_err() {
                self.poisoned = true;
                return written;
            }
        }

        let total_byte_size = columns
            .iter()
            .filter_map(|c| c.meta_data.as_ref())
            .map(|m| m.total_uncompressed_size)
            .sum();
        debug!(
            row_group = self.row_groups.len(),
            rows = self.buffered_rows,
            bytes = self.sink.bytes_written() - start,
            "flushed row group"
        );
        self.row_groups.push(format::RowGroup {
            columns,
            total_byte_size,
            num_rows: self.buffered_rows as i64,
        });
        self.total_rows += self.buffered_rows;
        self.buffered_rows = 0;
        Ok(())
    }

    /// Levels buffered for every column since the last flush, as
    /// `(column, defs, reps)`
    pub fn levels(&self) -> Vec<(&LeafColumn, &[i16], &[i16])> {
        self.chunks
            .iter()
            .map(|chunk| {
                let (defs, reps) = chunk.levels();
                (chunk.column(), defs, reps)
            })
            .collect()
    }

    /// Records written so far, buffered ones included
    pub fn num_rows(&self) -> usize {
        self.total_rows + self.buffered_rows
    }

    /// Close the writer and write the file footer
    ///
    /// This must be called to finalize the file. The sink is handed back.
    pub fn close(mut self) -> Result<W> {
        self.flush()?;

        let key_value_metadata = (!self.config.key_value_metadata.is_empty()).then(|| {
            self.config
                .key_value_metadata
                .iter()
                .map(|(key, value)| KeyValue {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect()
        });
        let metadata = FileMetaData {
            version: FORMAT_VERSION,
            schema: schema_to_elements(&self.tree),
            num_rows: self.total_rows as i64,
            row_groups: std::mem::take(&mut self.row_groups),
            key_value_metadata,
            created_by: Some(self.config.created_by.clone()),
        };

        let footer = serialize(&metadata)?;
        self.sink.write_all(&footer)?;
        self.sink.write_all(&(footer.len() as u32).to_le_bytes())?;
        self.sink.write_all(MAGIC)?;
        self.sink.flush()?;
        debug!(
            rows = self.total_rows,
            row_groups = metadata.row_groups.len(),
            footer_bytes = footer.len(),
            "wrote footer"
        );
        Ok(self.sink.into_inner())
    }

    fn check_poisoned(&self) -> Result<()> {
        if self.poisoned {
            return Err(ParquetError::invalid_argument(
                "writer failed during an earlier flush and cannot be used",
            ));
        }
        Ok(())
    }
}
