use crate::{ParquetField, ParquetRecord, RecordError, Result};
use dremel_core::traits::SchemaInspector;
use dremel_core::{FileMetadata, Reader, Schema, SchemaNode, Writer, WriterBuilder};
use std::io::{Read, Seek, Write};
use std::marker::PhantomData;
use tracing::debug;

/// Writes rows of `T` through the core writer
pub struct RecordWriter<W: Write, T> {
    inner: Writer<W>,
    _record: PhantomData<fn(&T)>,
}

impl<W: Write, T: ParquetRecord> RecordWriter<W, T> {
    /// Create a writer with the default configuration
    pub fn new(sink: W) -> Result<Self> {
        Self::with_builder(sink, WriterBuilder::new())
    }

    /// Create a writer configured by `builder`
    pub fn with_builder(sink: W, builder: WriterBuilder) -> Result<Self> {
        let schema = T::schema()?;
        debug!(
            record = std::any::type_name::<T>(),
            "creating typed record writer"
        );
        Ok(Self {
            inner: builder.build(sink, schema)?,
            _record: PhantomData,
        })
    }

    /// Buffer one record, flushing a row group when it is full
    pub fn add(&mut self, record: &T) -> Result<()> {
        self.inner.write_row(record.to_value())?;
        Ok(())
    }

    /// Write the buffered records as a row group
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Records buffered or written so far
    pub fn num_rows(&self) -> usize {
        self.inner.num_rows()
    }

    /// Flush, write the footer and return the sink
    pub fn close(self) -> Result<W> {
        Ok(self.inner.close()?)
    }
}

/// Reads rows of `T` through the core reader.
///
/// The file has to hold every column of `T` with the same type and
/// repetition; columns `T` does not declare are read and dropped.
pub struct RecordReader<R, T> {
    inner: Reader<R>,
    done: bool,
    _record: PhantomData<fn() -> T>,
}

impl<R: Read + Seek, T: ParquetRecord> RecordReader<R, T> {
    pub fn new(source: R) -> Result<Self> {
        let inner = Reader::new(source)?;
        check_layout(&T::schema()?, inner.schema())?;
        debug!(
            record = std::any::type_name::<T>(),
            rows = inner.num_rows(),
            "opened typed record reader"
        );
        Ok(Self {
            inner,
            done: false,
            _record: PhantomData,
        })
    }

    /// Footer metadata of the file
    pub fn metadata(&self) -> &FileMetadata {
        self.inner.metadata()
    }

    pub fn num_rows(&self) -> i64 {
        self.inner.num_rows()
    }

    fn read_next(&mut self) -> Result<Option<T>> {
        match self.inner.next_row()? {
            Some(value) => T::from_value(value).map(Some),
            None => Ok(None),
        }
    }
}

impl<R: Read + Seek, T: ParquetRecord> Iterator for RecordReader<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_next() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Check that every field `expected` declares exists in `actual` with the
/// same shape
fn check_layout(expected: &Schema, actual: &Schema) -> Result<()> {
    for path in expected.all_field_paths() {
        let Some(want) = expected.get_field_by_path(&path) else {
            continue;
        };
        let found = actual.get_field_by_path(&path).ok_or_else(|| {
            RecordError::schema(format!("column '{path}' is missing from the file"))
        })?;
        if !same_shape(want, found) {
            return Err(RecordError::schema(format!(
                "column '{path}' is {} in the file but {} in the record",
                describe(found),
                describe(want),
            )));
        }
    }
    Ok(())
}

fn same_shape(a: &SchemaNode, b: &SchemaNode) -> bool {
    let shape = match (a, b) {
        (
            SchemaNode::Primitive {
                primitive_type: x, ..
            },
            SchemaNode::Primitive {
                primitive_type: y, ..
            },
        ) => x == y,
        (SchemaNode::List { item: x, .. }, SchemaNode::List { item: y, .. }) => same_shape(x, y),
        // fields are compared path by path
        (SchemaNode::Struct { .. }, SchemaNode::Struct { .. }) => true,
        _ => false,
    };
    shape && a.is_nullable() == b.is_nullable()
}

fn describe(node: &SchemaNode) -> String {
    let optional = if node.is_nullable() { "optional " } else { "" };
    match node {
        SchemaNode::Primitive { primitive_type, .. } => {
            format!("{optional}{}", primitive_type.type_name())
        }
        SchemaNode::List { item, .. } => format!("{optional}list of {}", describe(item)),
        SchemaNode::Struct { .. } => format!("{optional}struct"),
        SchemaNode::Embedded { .. } => "embedded struct".to_string(),
    }
}
