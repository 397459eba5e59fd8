//! Columnar record storage built on Dremel shredding
//!
//! `dremel-core` turns nested records into Parquet column chunks and back.
//! It is independent of any particular record type; adapters (like
//! `dremel-record`) translate their own types to and from [`ParquetValue`].
//!
//! # Key Components
//!
//! - **Schema**: Declared schema and its compiled form
//!   - Builder API for constructing schemas
//!   - Nested structs, lists and embedded (inlined) structs
//!   - [`tree::SchemaTree`] validates the shape once and answers level queries
//!   - Schema introspection through the [`traits::SchemaInspector`] trait
//!
//! - **Columns**: One [`column::LeafColumn`] per primitive leaf
//!   - Path, repetitions and maximum definition/repetition levels
//!   - A compiled access plan shared by shredding and assembly
//!
//! - **Dremel**: [`dremel::shred`] flattens a record into values, definition
//!   levels and repetition levels; [`dremel::assemble`] rebuilds it
//!
//! - **Writer**: Row-at-a-time file writer
//!   - One PLAIN data page per column chunk, RLE/bit-packed levels
//!   - Snappy or no compression, footer statistics per column chunk
//!   - Uses `std::io::Write` for output flexibility
//!
//! - **Reader**: Row-at-a-time file reader
//!   - Rebuilds the schema from the footer
//!   - Loads row groups lazily
//!   - Uses `std::io::Read + Seek` for input flexibility
//!
//! # Example Usage
//!
//! ```no_run
//! use dremel_core::{ParquetValue, PrimitiveType, Reader, Schema, SchemaNode, Writer};
//! use std::io::Cursor;
//!
//! # fn main() -> dremel_core::Result<()> {
//! let schema = Schema {
//!     root: SchemaNode::Struct {
//!         name: "root".to_string(),
//!         nullable: false,
//!         fields: vec![
//!             SchemaNode::required("id", PrimitiveType::Int64),
//!             SchemaNode::repeated("tags", SchemaNode::required("element", PrimitiveType::String)),
//!         ],
//!     },
//! };
//!
//! let mut writer = Writer::new(Vec::new(), schema)?;
//! writer.write_row(ParquetValue::record([
//!     ("id", ParquetValue::Int64(1)),
//!     ("tags", ParquetValue::List(vec![ParquetValue::string("a")])),
//! ]))?;
//! let bytes = writer.close()?;
//!
//! let mut reader = Reader::new(Cursor::new(bytes))?;
//! while let Some(record) = reader.next_row()? {
//!     println!("{record:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod column;
pub mod compression;
pub mod dremel;
pub mod encoding;
pub mod error;
pub mod metadata;
pub mod naming;
pub mod reader;
pub mod schema;
pub mod statistics;
pub mod thrift_ext;
pub mod traits;
pub mod tree;
pub mod value;
pub mod writer;

#[cfg(test)]
pub mod test_utils;

pub use column::{resolve_columns, ColumnDescriptor, LeafColumn};
pub use compression::Compression;
pub use error::{ErrorContext, ParquetError, Result};
pub use metadata::{ColumnChunkMetadata, FileMetadata, RowGroupMetadata};
pub use naming::camel_case;
pub use reader::{Reader, RowIterator};
pub use schema::{PrimitiveType, Repetition, Schema, SchemaBuilder, SchemaNode};
pub use statistics::ColumnStatistics;
pub use tree::{NodeId, SchemaTree};
pub use value::ParquetValue;
pub use writer::{Writer, WriterBuilder, DEFAULT_ROW_GROUP_SIZE};
