//! Application state and dependency injection.

mod accounts;
mod archive;
mod config;
mod credentials;
mod documents;
mod identity;

use std::sync::Arc;
use std::time::Duration;

use derive_more::{Deref, From, Into};
use filegate_object::client::ObjectStoreClient;

pub use crate::service::accounts::{AccountDirectory, AccountService, IdentityToolkitDirectory};
pub use crate::service::archive::{
    ArchiveEntry, ArchiveError, ArchiveOptions, ArchiveRequest, ArchiveService, ArchiveStream,
};
pub use crate::service::config::{ServiceConfig, StorageBackend};
pub use crate::service::credentials::{ServiceAccountKey, ServiceAccountTokens};
pub use crate::service::documents::DocumentFetcher;
pub use crate::service::identity::{
    IdentityService, IdentityVerifier, JwksKeys, JwtVerifier, KeySource, Principal,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};


/// Canonical lifetime of presigned download links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deref, From, Into)]
pub struct LinkExpiry(Duration);

impl Default for LinkExpiry {
    fn default() -> Self {
        Self(Duration::from_secs(60))
    }
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub objects: ObjectStoreClient,
    pub identity: IdentityService,
    pub accounts: AccountService,
    pub documents: DocumentFetcher,

    // Internal services:
    pub archive: ArchiveService,
    pub link_expiry: LinkExpiry,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to the object store and loads the identity key material and
    /// service-account key.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::config("cannot build identity http client").with_source(e))?;

        let objects = config.connect_object_store().await?;
        let archive = ArchiveService::new(Arc::new(objects.clone()), config.archive_options());

        let service_state = Self {
            objects,
            identity: config.load_identity(&http).await?,
            accounts: config.account_service(&http).await?,
            documents: config.document_fetcher()?,

            archive,
            link_expiry: LinkExpiry(config.link_expiry()),
        };

        Ok(service_state)
    }

    /// Assembles state from already built services.
    ///
    /// Archives read through `objects` with default options; links expire
    /// after the default lifetime.
    pub fn new(
        objects: ObjectStoreClient,
        identity: IdentityService,
        accounts: AccountService,
        documents: DocumentFetcher,
    ) -> Self {
        let archive = ArchiveService::new(Arc::new(objects.clone()), ArchiveOptions::default());
        Self {
            objects,
            identity,
            accounts,
            documents,
            archive,
            link_expiry: LinkExpiry::default(),
        }
    }

    pub fn with_archive(self, archive: ArchiveService) -> Self {
        Self { archive, ..self }
    }

    pub fn with_link_expiry(self, link_expiry: Duration) -> Self {
        Self {
            link_expiry: LinkExpiry(link_expiry),
            ..self
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(objects: ObjectStoreClient);
impl_di!(identity: IdentityService);
impl_di!(accounts: AccountService);
impl_di!(documents: DocumentFetcher);

// Internal services:
impl_di!(archive: ArchiveService);
impl_di!(link_expiry: LinkExpiry);
