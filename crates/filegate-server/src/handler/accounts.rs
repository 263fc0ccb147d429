//! Account management handlers.

use axum::Router;
use axum::extract::State;
use axum::routing::delete;

use crate::extract::{AuthState, Path};
use crate::handler::Result;
use crate::service::{AccountService, ServiceState};

/// Tracing target for account operations.
const TRACING_TARGET: &str = "filegate_server::handler::accounts";

/// Deletes an identity-provider account.
///
/// Any authenticated caller may delete any account; the provider decides
/// whether the id exists.
#[tracing::instrument(skip_all, fields(user_id = %user_id, caller = auth_state.subject()))]
async fn delete_user(
    State(accounts): State<AccountService>,
    auth_state: AuthState,
    Path(user_id): Path<String>,
) -> Result<&'static str> {
    accounts.delete_account(&user_id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        user_id = %user_id,
        caller = auth_state.subject(),
        "User deleted"
    );

    Ok("User successfully deleted")
}

/// Returns a [`Router`] with all account routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/deleteUser/{user_id}", delete(delete_user))
}
