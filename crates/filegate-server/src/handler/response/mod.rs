//! Response types for HTTP handlers.

mod documents;
mod error_response;
mod files;
mod monitors;

pub use documents::CallbackAck;
pub use error_response::ErrorResponse;
pub use files::DownloadLink;
pub use monitors::HealthStatus;
