//! Error types for the table model.

/// Result type alias for table model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by table model operations.
///
/// None of these leave the model in an invalid state: the failed operation
/// simply did nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The source is not bound to this model.
    #[error("no binding for the given source")]
    UnknownSource,

    /// Stride must be at least 1.
    #[error("invalid stride {stride}: stride must be at least 1")]
    InvalidStride { stride: usize },

    /// A logical column outside `[0, column_count)`.
    #[error("logical column {column} is out of range (column count {column_count})")]
    ColumnOutOfRange { column: usize, column_count: usize },

    /// Row-number header text must not be blank.
    #[error("row-number header must not be empty")]
    EmptyHeader,

    /// Configuration rejected by validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
