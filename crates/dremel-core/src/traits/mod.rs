pub mod column;
pub mod schema;

pub use column::ColumnCodec;
pub use schema::SchemaInspector;
