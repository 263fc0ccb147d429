//! Centralized tracing target constants for structured logging.
//!
//! Using consistent targets enables fine-grained control over log output
//! via tracing subscriber filters.

/// Bearer token extraction and verification at the HTTP boundary.
pub const TRACING_TARGET_AUTHENTICATION: &str = "filegate_server::authentication";

/// Identity token verification, key set refresh and account deletion.
pub const TRACING_TARGET_IDENTITY: &str = "filegate_server::identity";

/// Zip archive assembly.
pub const TRACING_TARGET_ARCHIVE: &str = "filegate_server::archive";

/// Remote document downloads for editor callbacks.
pub const TRACING_TARGET_DOCUMENTS: &str = "filegate_server::documents";

/// Error recovery including middleware errors and request failures.
pub const TRACING_TARGET_RECOVERY_ERROR: &str = "filegate_server::recovery::error";

/// Panic recovery including handler panics and service failures.
pub const TRACING_TARGET_RECOVERY_PANIC: &str = "filegate_server::recovery::panic";
