use thiserror::Error;

/// Core error type for columnar encoding and decoding
#[derive(Error, Debug)]
pub enum ParquetError {
    /// IO errors from the underlying sink or source
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Thrift errors from footer and page header (de)serialization
    #[error("Thrift error: {0}")]
    Thrift(#[from] thrift::Error),

    /// Snappy compression errors
    #[error("Compression error: {0}")]
    Snappy(#[from] snap::Error),

    /// Schema resolution errors, raised once when a schema is compiled
    #[error("Schema error: {0}")]
    Schema(String),

    /// Type conversion errors
    #[error("Conversion error: {0}")]
    Conversion(String),

    /// Invalid argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A record does not match the schema it is written with
    #[error("Data validation error: {0}")]
    DataValidation(String),

    /// Unsupported schema shapes, encodings or codecs
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Shredded values and levels disagree with each other
    #[error("Encoding invariant violated: {0}")]
    Encoding(String),

    /// Malformed file contents
    #[error("Corrupt file: {0}")]
    Corrupt(String),

    /// Internal errors that shouldn't happen
    #[error("Internal error: {0}")]
    Internal(String),

    /// UTF-8 decoding errors
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type alias for Parquet operations
pub type Result<T> = std::result::Result<T, ParquetError>;

impl ParquetError {
    /// Create a new schema error
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        ParquetError::Schema(msg.into())
    }

    /// Create a new conversion error
    pub fn conversion<S: Into<String>>(msg: S) -> Self {
        ParquetError::Conversion(msg.into())
    }

    /// Create a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ParquetError::InvalidArgument(msg.into())
    }

    /// Create a new data validation error
    pub fn data_validation<S: Into<String>>(msg: S) -> Self {
        ParquetError::DataValidation(msg.into())
    }

    /// Create a new unsupported operation error
    pub fn unsupported<S: Into<String>>(msg: S) -> Self {
        ParquetError::Unsupported(msg.into())
    }

    /// Create a new corrupt file error
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        ParquetError::Corrupt(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        ParquetError::Internal(msg.into())
    }

    /// Report a broken shredding/assembly invariant.
    ///
    /// Debug builds panic so the bug surfaces at its origin; release builds
    /// return [`ParquetError::Encoding`] and never truncate data silently.
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        let msg = msg.into();
        debug_assert!(false, "encoding invariant violated: {msg}");
        ParquetError::Encoding(msg)
    }

    /// Prefix the message with `ctx`.
    ///
    /// Message variants and I/O errors keep their kind, so callers can still
    /// tell a corrupt file from a failing sink. Thrift and UTF-8 errors only
    /// come from decoding file bytes and become `Corrupt`; snappy errors
    /// become `Internal`.
    pub fn with_prefix(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ParquetError::Io(e) => {
                ParquetError::Io(std::io::Error::new(e.kind(), format!("{ctx}: {e}")))
            }
            ParquetError::Schema(msg) => ParquetError::Schema(format!("{ctx}: {msg}")),
            ParquetError::Conversion(msg) => ParquetError::Conversion(format!("{ctx}: {msg}")),
            ParquetError::InvalidArgument(msg) => {
                ParquetError::InvalidArgument(format!("{ctx}: {msg}"))
            }
            ParquetError::DataValidation(msg) => {
                ParquetError::DataValidation(format!("{ctx}: {msg}"))
            }
            ParquetError::Unsupported(msg) => ParquetError::Unsupported(format!("{ctx}: {msg}")),
            ParquetError::Encoding(msg) => ParquetError::Encoding(format!("{ctx}: {msg}")),
            ParquetError::Corrupt(msg) => ParquetError::Corrupt(format!("{ctx}: {msg}")),
            ParquetError::Internal(msg) => ParquetError::Internal(format!("{ctx}: {msg}")),
            ParquetError::Thrift(e) => ParquetError::Corrupt(format!("{ctx}: {e}")),
            ParquetError::Utf8(e) => ParquetError::Corrupt(format!("{ctx}: {e}")),
            ParquetError::Snappy(e) => ParquetError::Internal(format!("{ctx}: {e}")),
        }
    }
}

/// Extension trait to add context to errors
pub trait ErrorContext<T> {
    /// Add context to an error
    fn context<S: Into<String>>(self, ctx: S) -> Result<T>;

    /// Add context with a closure that's only called on error
    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ParquetError>,
{
    fn context<S: Into<String>>(self, ctx: S) -> Result<T> {
        self.map_err(|e| e.into().with_prefix(ctx.into()))
    }

    fn with_context<S: Into<String>, F: FnOnce() -> S>(self, f: F) -> Result<T> {
        self.map_err(|e| e.into().with_prefix(f().into()))
    }
}
