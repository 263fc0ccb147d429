//! Request extractors with JSON error responses.
//!
//! - [`AuthHeader`] pulls the bearer credential out of `Authorization`.
//! - [`AuthState`] verifies it and yields the caller's [`Principal`].
//! - [`Json`], [`Path`] and [`Multipart`] wrap their axum counterparts so
//!   rejections render as [`ErrorResponse`] bodies.
//!
//! [`Principal`]: crate::service::Principal
//! [`ErrorResponse`]: crate::handler::response::ErrorResponse

mod auth;
mod reject;

pub use crate::extract::auth::{AuthHeader, AuthState};
pub use crate::extract::reject::{Json, Multipart, Path};
