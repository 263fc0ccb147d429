//! Request types for HTTP handlers.

mod documents;
mod files;

pub use documents::DocumentCallback;
pub use files::ArchiveFolder;
