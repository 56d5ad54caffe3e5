//! Error types for the tabprobe library.
//!
//! Coercion and condition building never fail: they degrade to empty strings,
//! NaN operands or identity pass-through. Errors only come from the requestor
//! boundary and from session bookkeeping, and all of them are represented by
//! the `ProbeError` enum.

use thiserror::Error;

/// The main error type for the tabprobe library.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// A requestor call failed.
    #[error("Requestor '{operation}' failed: {message}")]
    Requestor {
        /// Name of the requestor operation (e.g., "filter", "values")
        operation: String,
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requestor has no view registered under the given wrapper guid.
    #[error("Unknown wrapper guid '{guid}'")]
    UnknownView { guid: String },

    /// A column id is not part of the dataset.
    #[error("Column {column_id} not found in dataset")]
    ColumnNotFound { column_id: usize },

    /// A row id requested for drill-down is not part of the dataset.
    #[error("Row {row_id} not found in dataset")]
    RowNotFound { row_id: u64 },

    /// The session has not been loaded yet.
    #[error("Session is not loaded; call load() first")]
    NotLoaded,

    /// Error when an operation is not supported by the requestor.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// A regular expression sent with a filter or search request is invalid.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, ProbeError>`.
///
/// # Examples
///
/// ```rust
/// use tabprobe::error::Result;
///
/// fn probe() -> Result<()> {
///     Ok(())
/// }
/// # probe().unwrap();
/// ```
pub type Result<T> = std::result::Result<T, ProbeError>;

impl ProbeError {
    /// Creates a new requestor error for the given operation.
    pub fn requestor(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Requestor {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new requestor error with a source error.
    pub fn requestor_with_source(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Requestor {
            operation: operation.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new unknown view error.
    pub fn unknown_view(guid: impl Into<String>) -> Self {
        Self::UnknownView { guid: guid.into() }
    }

    /// Returns true when the error means the requestor lacks the operation.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported(_))
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ProbeError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| wrap(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(&f(), e.into()))
    }
}

fn wrap(msg: &str, base: ProbeError) -> ProbeError {
    match base {
        ProbeError::Requestor {
            operation,
            message,
            source,
        } => ProbeError::Requestor {
            operation,
            message: format!("{msg}: {message}"),
            source,
        },
        ProbeError::Internal(inner) => ProbeError::Internal(format!("{msg}: {inner}")),
        other => ProbeError::Internal(format!("{msg}: {other}")),
    }
}
