//! Archive error to HTTP error conversion implementation.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::ArchiveError;

/// Tracing target for archive error conversions.
const TRACING_TARGET: &str = "filegate_server::handler::archive";

impl From<ArchiveError> for HttpError<'static> {
    fn from(error: ArchiveError) -> Self {
        if matches!(error, ArchiveError::Empty) {
            return ErrorKind::BadRequest.with_message("No files provided");
        }

        if error.is_not_found() {
            tracing::warn!(target: TRACING_TARGET, error = %error, "Archive entry not found");
            let not_found = ErrorKind::NotFound.with_message("File not found");
            return match error.key() {
                Some(key) => not_found.with_resource(key.to_owned()),
                None => not_found,
            };
        }

        tracing::error!(target: TRACING_TARGET, error = %error, "Archive operation failed");
        ErrorKind::InternalServerError.with_message("Failed to create archive")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_request_is_a_bad_request() {
        let error = HttpError::from(ArchiveError::Empty);
        assert_eq!(error.kind(), ErrorKind::BadRequest);
        assert_eq!(error.message(), Some("No files provided"));
    }

    #[test]
    fn missing_entry_names_the_key() {
        let error = HttpError::from(ArchiveError::Open {
            index: 0,
            key: "a.txt".to_owned(),
            source: filegate_object::Error::not_found("memory", "uploads/a.txt"),
        });
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.resource(), Some("a.txt"));
    }

    #[test]
    fn other_failures_are_internal() {
        let error = HttpError::from(ArchiveError::Timeout {
            index: 2,
            key: "slow".to_owned(),
        });
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
    }
}
