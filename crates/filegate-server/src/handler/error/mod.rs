//! [`Error`], [`ErrorKind`] and [`Result`].

mod archive_error;
mod http_error;
mod object_error;
mod service_error;

pub use http_error::{Error, ErrorKind, Result};
