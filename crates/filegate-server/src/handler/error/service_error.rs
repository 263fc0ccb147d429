//! Service error to HTTP error conversion implementation.
//!
//! Client-caused kinds keep their message; server-side kinds are logged and
//! answered with a generic message so internals do not leak.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::ErrorKind as ServiceErrorKind;

/// Tracing target for service error conversions.
const TRACING_TARGET: &str = "filegate_server::handler::service";

impl From<crate::Error> for HttpError<'static> {
    fn from(error: crate::Error) -> Self {
        let message = error.message().to_owned();

        match error.kind() {
            ServiceErrorKind::Auth => {
                tracing::warn!(target: TRACING_TARGET, error = %error, "Authentication failed");
                ErrorKind::Unauthorized.into_error()
            }
            ServiceErrorKind::NotFound => ErrorKind::NotFound.with_message(message),
            ServiceErrorKind::MalformedRequest => ErrorKind::BadRequest.with_message(message),
            ServiceErrorKind::Unsupported => {
                tracing::warn!(target: TRACING_TARGET, error = %error, "Unsupported operation");
                ErrorKind::NotImplemented.with_context(message)
            }
            ServiceErrorKind::External => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "External service request failed"
                );
                ErrorKind::InternalServerError.with_message(message)
            }
            ServiceErrorKind::Config | ServiceErrorKind::Internal => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = %error.kind(),
                    "Service operation failed"
                );
                ErrorKind::InternalServerError.into_error()
            }
        }
    }
}
