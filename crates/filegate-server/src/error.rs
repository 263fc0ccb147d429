//! Service layer error types.
//!
//! [`Error`] carries an [`ErrorKind`] for categorization, a message, and an
//! optional boxed source. HTTP handlers convert it into a response in
//! `handler::error::service_error`.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for service layer operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error kind enumeration for categorizing service layer errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration-related errors.
    Config,
    /// External service communication errors.
    External,
    /// The presented credential was rejected.
    Auth,
    /// The addressed resource does not exist.
    NotFound,
    /// The request was understood but its content is unusable.
    MalformedRequest,
    /// The operation is not available in this deployment.
    Unsupported,
    /// Internal service logic errors.
    Internal,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::External => "external_service",
            Self::Auth => "auth",
            Self::NotFound => "not_found",
            Self::MalformedRequest => "malformed_request",
            Self::Unsupported => "unsupported",
            Self::Internal => "internal_service",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service layer error with structured information.
///
/// The name of the failing dependency is kept apart from the message: it
/// shows up in logs through [`Display`], never in [`Error::message`].
///
/// [`Display`]: fmt::Display
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {}{message}", service_prefix(.service))]
pub struct Error {
    kind: ErrorKind,
    service: Option<Cow<'static, str>>,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            service: None,
            message: message.into(),
            source: None,
        }
    }

    #[inline]
    fn from_service(
        kind: ErrorKind,
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            service: Some(service.into()),
            ..Self::new(kind, message)
        }
    }

    /// Attaches a source error to this error.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the dependency that failed, for external and internal errors.
    #[must_use]
    #[inline]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new external service error.
    #[inline]
    pub fn external(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::from_service(ErrorKind::External, service, message)
    }

    /// Creates a new authentication error.
    #[inline]
    pub fn auth(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// Creates a new not-found error.
    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new malformed-request error.
    #[inline]
    pub fn malformed_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::MalformedRequest, message)
    }

    /// Creates a new unsupported-operation error.
    #[inline]
    pub fn unsupported(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unsupported, message)
    }

    /// Creates a new internal service error.
    #[inline]
    pub fn internal(
        service: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::from_service(ErrorKind::Internal, service, message)
    }
}

fn service_prefix(service: &Option<Cow<'static, str>>) -> String {
    service.as_deref().map(|s| format!("{s}: ")).unwrap_or_default()
}

impl From<filegate_object::Error> for Error {
    fn from(err: filegate_object::Error) -> Self {
        use filegate_object::ErrorKind as ObjectErrorKind;

        let message = err.message().to_owned();
        let error = match err.kind() {
            ObjectErrorKind::NotFound => Self::not_found(message),
            ObjectErrorKind::NotSupported => Self::unsupported(message),
            _ => Self::external("object-store", message),
        };
        error.with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("invalid configuration");
        assert_eq!(error.kind(), ErrorKind::Config);
        assert_eq!(error.message(), "invalid configuration");
    }

    #[test]
    fn error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::config("cannot read public key").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn external_service_error() {
        let error = Error::external("jwks", "Connection refused");

        assert_eq!(error.kind(), ErrorKind::External);
        assert_eq!(error.service(), Some("jwks"));
        assert_eq!(error.message(), "Connection refused");
        assert_eq!(
            error.to_string(),
            "external_service error: jwks: Connection refused"
        );
    }

    #[test]
    fn object_errors_keep_their_category() {
        let missing = filegate_object::Error::not_found("object-store", "uploads/a");
        assert_eq!(Error::from(missing).kind(), ErrorKind::NotFound);

        let down = filegate_object::Error::unavailable("object-store", "timeout");
        assert_eq!(Error::from(down).kind(), ErrorKind::External);
    }
}
