use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic, ReadExecutor};

/// Error kinds for jotdb operations
///
/// This enum represents all possible error types that can occur during jotdb operations.
/// Each error kind describes a specific category of failure, enabling precise error handling.
///
/// # Examples
///
/// ```rust,ignore
/// use jotdb::errors::{JotError, ErrorKind, JotResult};
///
/// fn example() -> JotResult<()> {
///     Err(JotError::new("record not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// The requested resource was not found
    NotFound,
    /// The provided record id is invalid
    InvalidId,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Error writing or renaming a collection file
    IoError,
    /// Error encoding or decoding persisted data
    EncodingError,
    /// Caller input failed validation (query too short, malformed predicate, etc.)
    ValidationError,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not found"),
            ErrorKind::InvalidId => write!(f, "Invalid id"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::IoError => write!(f, "IO error"),
            ErrorKind::EncodingError => write!(f, "Encoding error"),
            ErrorKind::ValidationError => write!(f, "Validation error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom jotdb error type.
///
/// `JotError` encapsulates error information including the error message, kind, and optional
/// cause. It supports error chaining and backtraces for debugging.
///
/// # Examples
///
/// ```rust,ignore
/// use jotdb::errors::{JotError, ErrorKind};
///
/// // Create a simple error
/// let err = JotError::new("query too short", ErrorKind::ValidationError);
///
/// // Create an error with a cause
/// let cause = JotError::new("disk full", ErrorKind::IoError);
/// let err = JotError::new_with_cause("failed to persist collection", ErrorKind::IoError, cause);
/// ```
///
/// # Type alias
///
/// The `JotResult<T>` type alias is equivalent to `Result<T, JotError>` and is used
/// throughout the codebase for operations that can fail.
#[derive(Clone)]
pub struct JotError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<JotError>>,
    backtrace: Atomic<Backtrace>,
}

impl JotError {
    /// Creates a new `JotError` with the specified message and error kind.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    ///
    /// # Returns
    ///
    /// A new `JotError` instance.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        JotError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `JotError` with a cause error.
    ///
    /// This creates an error chain where the cause error is preserved for debugging.
    ///
    /// # Arguments
    ///
    /// * `message` - A description of the error
    /// * `error_kind` - The category of error
    /// * `cause` - The underlying error that caused this error
    ///
    /// # Returns
    ///
    /// A new `JotError` instance with the cause error attached.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: JotError) -> Self {
        JotError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Wraps a `std::io::Error` with operation context.
    pub fn io(message: &str, cause: std::io::Error) -> Self {
        JotError::new_with_cause(
            message,
            ErrorKind::IoError,
            JotError::new(&cause.to_string(), ErrorKind::IoError),
        )
    }

    /// Wraps a `serde_json::Error` with operation context.
    pub fn encoding(message: &str, cause: serde_json::Error) -> Self {
        JotError::new_with_cause(
            message,
            ErrorKind::EncodingError,
            JotError::new(&cause.to_string(), ErrorKind::EncodingError),
        )
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&JotError> {
        self.cause.as_deref()
    }
}

impl Display for JotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_kind, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {})", cause)?;
        }
        Ok(())
    }
}

impl Debug for JotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_kind, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, "\ncaused by: {:?}", cause)?;
        }
        self.backtrace
            .read_with(|bt| write!(f, "\nbacktrace:\n{:?}", bt))
    }
}

impl Error for JotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_ref().map(|c| c.as_ref() as &dyn Error)
    }
}

/// Result type used throughout jotdb.
pub type JotResult<T> = Result<T, JotError>;
