use dremel_core::ParquetError;
use thiserror::Error;

/// Errors raised while mapping typed records onto the core value model
#[derive(Error, Debug)]
pub enum RecordError {
    /// Errors from the core encoder or decoder
    #[error(transparent)]
    Core(#[from] ParquetError),

    /// IO errors from opening sinks and sources
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A Rust type has no column layout, or disagrees with a file's layout
    #[error("Schema error: {0}")]
    Schema(String),

    /// A decoded value does not fit the field it is read into
    #[error("Conversion error: {0}")]
    Conversion(String),
}

/// Result type alias for typed record operations
pub type Result<T> = std::result::Result<T, RecordError>;

impl RecordError {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        Self::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        Self::Conversion(msg.into())
    }

    /// Prefix a conversion error with the column it happened in
    pub(crate) fn in_column(self, column: &str) -> Self {
        match self {
            Self::Conversion(msg) => Self::Conversion(format!("column '{column}': {msg}")),
            other => other,
        }
    }
}
