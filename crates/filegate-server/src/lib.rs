#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod utility;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::utility::tracing_targets::{
    TRACING_TARGET_ARCHIVE, TRACING_TARGET_AUTHENTICATION, TRACING_TARGET_DOCUMENTS,
    TRACING_TARGET_IDENTITY,
};
