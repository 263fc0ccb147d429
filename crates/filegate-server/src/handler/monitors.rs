//! Liveness handler.

use axum::Router;
use axum::routing::get;

use crate::extract::Json;
use crate::handler::response::HealthStatus;
use crate::service::ServiceState;

/// Reports that the process is up. Does not contact the store.
#[tracing::instrument]
async fn health_status() -> Json<HealthStatus> {
    Json(HealthStatus::healthy())
}

/// Returns a [`Router`] with all health monitoring routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health_status))
}
