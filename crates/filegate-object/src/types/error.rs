//! Error type for object-store operations.

use std::fmt;

/// Boxed error used as the source of an [`Error`].
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for object-store operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Category of an object-store failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No object is stored under the requested key.
    NotFound,
    /// The store rejected the credentials or the operation.
    AccessDenied,
    /// The store could not be reached or failed internally.
    Unavailable,
    /// The backend does not support the operation (e.g. presigning).
    NotSupported,
    /// A conditional write lost against the current object state.
    Conflict,
    /// The key could not be turned into a store path.
    InvalidKey,
}

impl ErrorKind {
    /// Returns the kind as a stable string for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::Unavailable => "unavailable",
            Self::NotSupported => "not_supported",
            Self::Conflict => "conflict",
            Self::InvalidKey => "invalid_key",
        }
    }

    /// Whether an operation failing with this kind may succeed on retry.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified object-store error carrying a message and an optional source.
#[derive(Debug, thiserror::Error)]
#[error("[{label}] {message}")]
pub struct Error {
    kind: ErrorKind,
    label: &'static str,
    message: String,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates an error of the given kind formatted as `[{label}] {msg}`.
    pub fn new(kind: ErrorKind, label: &'static str, msg: impl fmt::Display) -> Self {
        Self {
            kind,
            label,
            message: msg.to_string(),
            source: None,
        }
    }

    /// Creates a [`ErrorKind::NotFound`] error.
    pub fn not_found(label: &'static str, msg: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotFound, label, msg)
    }

    /// Creates an [`ErrorKind::Unavailable`] error.
    pub fn unavailable(label: &'static str, msg: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Unavailable, label, msg)
    }

    /// Creates an [`ErrorKind::NotSupported`] error.
    pub fn not_supported(label: &'static str, msg: impl fmt::Display) -> Self {
        Self::new(ErrorKind::NotSupported, label, msg)
    }

    /// Attach a source error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the failure category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the message without the label prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the caller should retry this operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}
