#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod client;
/// Provider trait and object storage provider factories.
pub mod providers;
/// Inlined types (Error, ErrorKind, KeyPrefix).
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use crate::types::{Error, ErrorKind, Result};
