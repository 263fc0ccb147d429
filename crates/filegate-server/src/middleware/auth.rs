//! Authentication middleware for private routes.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a verified bearer token before the request reaches a handler.
///
/// Rejections happen in the [`AuthState`] extractor, so a request without
/// valid credentials never touches the object store.
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
