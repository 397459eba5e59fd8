//! Core Parquet reading functionality

use crate::chunk::ColumnChunk;
use crate::column::{resolve_columns, LeafColumn};
use crate::compression::Compression;
use crate::metadata::{schema_from_elements, FileMetadata};
use crate::statistics::ColumnStatistics;
use crate::thrift_ext::deserialize;
use crate::thrift_ext::format::FileMetaData;
use crate::traits::ColumnCodec;
use crate::tree::SchemaTree;
use crate::writer::MAGIC;
use crate::{ErrorContext, ParquetError, ParquetValue, Result, Schema};
use std::io::{Read, Seek, SeekFrom};
use tracing::debug;

/// Leading magic, footer length and trailing magic
const MIN_FILE_SIZE: u64 = 12;

/// Reader of records from any source implementing Read + Seek.
///
/// Row groups are loaded lazily, one at a time, the first time a record
/// from them is requested.
pub struct Reader<R> {
    source: R,
    schema: Schema,
    tree: SchemaTree,
    skeleton: ParquetValue,
    footer: FileMetaData,
    metadata: FileMetadata,
    chunks: Vec<ColumnChunk>,
    next_row_group: usize,
    rows_left: usize,
}

impl<R: Read + Seek> Reader<R> {
    /// Open a file, decode its footer and rebuild its schema
    pub fn new(mut source: R) -> Result<Self> {
        let len = source.seek(SeekFrom::End(0))?;
        if len < MIN_FILE_SIZE {
            return Err(ParquetError::corrupt(format!(
                "file of {len} bytes is too small"
            )));
        }

        let mut magic = [0u8; 4];
        source.seek(SeekFrom::Start(0))?;
        source.read_exact(&mut magic)?;
        if &magic != MAGIC {
            return Err(ParquetError::corrupt("file does not start with PAR1"));
        }

        let mut tail = [0u8; 8];
        source.seek(SeekFrom::End(-8))?;
        source.read_exact(&mut tail)?;
        if &tail[4..] != MAGIC {
            return Err(ParquetError::corrupt("file does not end with PAR1"));
        }
        let footer_len = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]) as u64;
        if footer_len + MIN_FILE_SIZE > len {
            return Err(ParquetError::corrupt(format!(
                "footer of {footer_len} bytes does not fit a file of {len} bytes"
            )));
        }

        let mut buf = vec![0u8; footer_len as usize];
        source.seek(SeekFrom::Start(len - 8 - footer_len))?;
        source.read_exact(&mut buf)?;
        let (footer, _) = deserialize::<FileMetaData>(&buf)?;

        let schema = schema_from_elements(&footer.schema)?;
        let tree = SchemaTree::try_new(&schema)?;
        let columns = resolve_columns(&tree);
        let metadata = FileMetadata::try_from_thrift(&footer, &columns)?;
        debug!(
            rows = footer.num_rows,
            row_groups = footer.row_groups.len(),
            columns = columns.len(),
            footer_bytes = footer_len,
            "read footer"
        );

        Ok(Reader {
            source,
            skeleton: tree.skeleton(tree.root()),
            chunks: columns
                .into_iter()
                .map(|column| ColumnChunk::new(column, Compression::default()))
                .collect(),
            schema,
            tree,
            footer,
            metadata,
            next_row_group: 0,
            rows_left: 0,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn tree(&self) -> &SchemaTree {
        &self.tree
    }

    /// Get the file metadata
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    pub fn num_rows(&self) -> i64 {
        self.footer.num_rows
    }

    pub fn num_row_groups(&self) -> usize {
        self.footer.row_groups.len()
    }

    /// Leaf columns in file order
    pub fn columns(&self) -> impl Iterator<Item = &LeafColumn> {
        self.chunks.iter().map(|c| c.column())
    }

    /// Footer statistics of every column of a row group, in column order
    pub fn column_statistics(&self, row_group: usize) -> Result<Vec<Option<&ColumnStatistics>>> {
        let group = self.metadata.row_groups.get(row_group).ok_or_else(|| {
            ParquetError::invalid_argument(format!(
                "row group {} out of range, file has {}",
                row_group,
                self.metadata.row_groups.len()
            ))
        })?;
        Ok(group
            .columns
            .iter()
            .map(|c| c.statistics.as_ref())
            .collect())
    }

    /// Levels of the loaded row group, as `(column, defs, reps)`
    pub fn levels(&self) -> Vec<(&LeafColumn, &[i16], &[i16])> {
        self.chunks
            .iter()
            .map(|chunk| {
                let (defs, reps) = chunk.levels();
                (chunk.column(), defs, reps)
            })
            .collect()
    }

    fn load_row_group(&mut self) -> Result<()> {
        let index = self.next_row_group;
        let group = &self.footer.row_groups[index];
        let num_rows = usize::try_from(group.num_rows).map_err(|_| {
            ParquetError::corrupt(format!("row group {index} has a negative row count"))
        })?;
        if group.columns.len() != self.chunks.len() {
            return Err(ParquetError::corrupt(format!(
                "row group {} has {} column chunks, schema has {} columns",
                index,
                group.columns.len(),
                self.chunks.len()
            )));
        }
        for (chunk, meta) in self.chunks.iter_mut().zip(&group.columns) {
            chunk
                .read(&mut self.source, meta)
                .with_context(|| format!("row group {index}"))?;
        }
        debug!(row_group = index, rows = num_rows, "loaded row group");

        self.next_row_group += 1;
        self.rows_left = num_rows;
        Ok(())
    }

    /// Assemble the next record into `record`, replacing its contents.
    ///
    /// Returns `false` once every row group is exhausted.
    pub fn scan(&mut self, record: &mut ParquetValue) -> Result<bool> {
        while self.rows_left == 0 {
            if self.next_row_group >= self.footer.row_groups.len() {
                return Ok(false);
            }
            self.load_row_group()?;
        }

        record.clone_from(&self.skeleton);
        for chunk in &mut self.chunks {
            chunk.scan(record)?;
        }
        self.rows_left -= 1;
        Ok(true)
    }

    /// Read the next record
    pub fn next_row(&mut self) -> Result<Option<ParquetValue>> {
        let mut record = self.skeleton.clone();
        Ok(self.scan(&mut record)?.then_some(record))
    }

    /// Read rows from the file
    ///
    /// Returns an iterator that stops after the first error
    pub fn read_rows(self) -> RowIterator<R> {
        RowIterator {
            reader: self,
            failed: false,
        }
    }
}

/// Iterator over the records of a file
pub struct RowIterator<R> {
    reader: Reader<R>,
    failed: bool,
}

impl<R: Read + Seek> Iterator for RowIterator<R> {
    type Item = Result<ParquetValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_row() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
