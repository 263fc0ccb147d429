//! Object store error to HTTP error conversion implementation.

use filegate_object::ErrorKind as ObjectErrorKind;

use super::http_error::{Error as HttpError, ErrorKind};

/// Tracing target for object store error conversions.
const TRACING_TARGET: &str = "filegate_server::handler::object";

impl From<filegate_object::Error> for HttpError<'static> {
    fn from(error: filegate_object::Error) -> Self {
        match error.kind() {
            ObjectErrorKind::NotFound => {
                tracing::debug!(target: TRACING_TARGET, error = %error, "Object not found");
                ErrorKind::NotFound
                    .with_message("File not found")
                    .with_resource("file")
            }
            ObjectErrorKind::NotSupported => {
                tracing::warn!(target: TRACING_TARGET, error = %error, "Unsupported object operation");
                ErrorKind::NotImplemented.with_context(error.message().to_owned())
            }
            kind => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    error_kind = ?kind,
                    retryable = error.is_retryable(),
                    "Object store request failed"
                );
                ErrorKind::InternalServerError.with_message("Storage request failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;

    #[test]
    fn object_errors_map_to_statuses() {
        let missing = HttpError::from(filegate_object::Error::not_found("memory", "uploads/a"));
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let unsigned = HttpError::from(filegate_object::Error::not_supported("memory", "presign"));
        assert_eq!(unsigned.kind().status_code(), StatusCode::NOT_IMPLEMENTED);

        let down = HttpError::from(filegate_object::Error::unavailable("s3", "connection reset"));
        assert_eq!(down.kind(), ErrorKind::InternalServerError);
        assert_eq!(down.context(), None);
    }
}
