//! Identity-provider account administration.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use super::credentials::ServiceAccountTokens;
use crate::utility::tracing_targets::TRACING_TARGET_IDENTITY as TRACING_TARGET;
use crate::{Error, Result};

/// Deletes user accounts at the identity provider.
#[async_trait]
pub trait AccountDirectory: Send + Sync + 'static {
    /// Deletes the account `user_id`; an unknown id is a not-found error.
    async fn delete_account(&self, user_id: &str) -> Result<()>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteAccountRequest<'a> {
    local_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ToolkitErrorBody {
    #[serde(default)]
    error: ToolkitError,
}

#[derive(Debug, Default, Deserialize)]
struct ToolkitError {
    #[serde(default)]
    message: String,
}

/// [`AccountDirectory`] backed by the Identity Toolkit REST API.
///
/// Calls `POST {endpoint}/projects/{project}/accounts:delete` with an access
/// token minted from the service account. Without service-account tokens
/// every deletion is unsupported.
pub struct IdentityToolkitDirectory {
    client: reqwest::Client,
    endpoint: Url,
    project_id: String,
    tokens: Option<ServiceAccountTokens>,
}

impl IdentityToolkitDirectory {
    /// Default API root.
    pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";

    pub fn new(
        client: reqwest::Client,
        endpoint: Url,
        project_id: impl Into<String>,
        tokens: Option<ServiceAccountTokens>,
    ) -> Self {
        Self {
            client,
            endpoint,
            project_id: project_id.into(),
            tokens,
        }
    }

    fn delete_url(&self) -> String {
        format!(
            "{}/projects/{}/accounts:delete",
            self.endpoint.as_str().trim_end_matches('/'),
            self.project_id
        )
    }
}

impl fmt::Debug for IdentityToolkitDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToolkitDirectory")
            .field("endpoint", &self.endpoint.as_str())
            .field("project_id", &self.project_id)
            .field("tokens", &self.tokens)
            .finish()
    }
}

#[async_trait]
impl AccountDirectory for IdentityToolkitDirectory {
    async fn delete_account(&self, user_id: &str) -> Result<()> {
        let Some(tokens) = self.tokens.as_ref() else {
            return Err(Error::unsupported(
                "account deletion requires a service account key",
            ));
        };
        let token = tokens.access_token().await?;

        let response = self
            .client
            .post(self.delete_url())
            .bearer_auth(token)
            .json(&DeleteAccountRequest { local_id: user_id })
            .send()
            .await
            .map_err(|e| {
                Error::external("identity-toolkit", "account deletion request failed").with_source(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            tokens.invalidate().await;
        }

        let body: ToolkitErrorBody = response.json().await.unwrap_or_default();
        if body.error.message.starts_with("USER_NOT_FOUND") {
            return Err(Error::not_found("User not found"));
        }

        Err(Error::external(
            "identity-toolkit",
            format!("account deletion failed ({status}): {}", body.error.message),
        ))
    }
}

/// Shared handle to the configured [`AccountDirectory`].
#[derive(Clone)]
pub struct AccountService {
    directory: Arc<dyn AccountDirectory>,
}

impl AccountService {
    pub fn new(directory: impl AccountDirectory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }

    /// Deletes the account `user_id`.
    pub async fn delete_account(&self, user_id: &str) -> Result<()> {
        self.directory.delete_account(user_id).await?;
        tracing::info!(target: TRACING_TARGET, user_id, "Account deleted");
        Ok(())
    }
}

impl fmt::Debug for AccountService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountService").finish_non_exhaustive()
    }
}
