//! Typed records for dremel-core
//!
//! This crate maps plain Rust structs onto the dynamic schema and value model
//! of `dremel-core`, so rows can be written and read without building
//! `ParquetValue` trees by hand.
//!
//! # Overview
//!
//! ## Fields
//!
//! [`ParquetField`] gives every supported Rust type a column layout. The
//! repetition of a field follows from its type:
//!
//! - `i32`, `u32`, `i64`, `u64`, `f32`, `f64`, `bool`, `String` ↔ required columns
//! - `Option<T>` ↔ optional fields
//! - `Vec<T>` ↔ repeated fields
//! - records declared with [`parquet_record!`] ↔ nested groups
//! - `#[embed]` record fields ↔ columns inlined into the enclosing record
//!
//! ## Records
//!
//! [`parquet_record!`] declares a struct, names the column behind each field
//! and implements [`ParquetRecord`] for it. [`RecordWriter`] and
//! [`RecordReader`] drive the core writer and reader with those structs.
//!
//! ## Code Generation
//!
//! [`codegen::generate`] produces `parquet_record!` declarations for an
//! existing schema, for example one read from a file's footer.
//!
//! # Example
//!
//! ```no_run
//! use dremel_record::{parquet_record, RecordReader, RecordWriter};
//! use std::fs::File;
//!
//! parquet_record! {
//!     #[derive(Debug, Clone, PartialEq)]
//!     pub struct Reading {
//!         pub sensor: String => "sensor",
//!         pub value: Option<f64> => "value",
//!     }
//! }
//!
//! # fn main() -> dremel_record::Result<()> {
//! let mut writer = RecordWriter::<_, Reading>::new(File::create("readings.parquet")?)?;
//! writer.add(&Reading { sensor: "a".to_string(), value: Some(1.5) })?;
//! writer.close()?;
//!
//! for reading in RecordReader::<_, Reading>::new(File::open("readings.parquet")?)? {
//!     println!("{:?}", reading?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod codegen;
pub mod error;
pub use error::{RecordError, Result};

pub mod field;
pub use field::ParquetField;

pub mod io;
pub use io::{RecordReader, RecordWriter};

pub mod record;
pub use record::ParquetRecord;

// Used by `parquet_record!`
#[doc(hidden)]
pub use dremel_core;
