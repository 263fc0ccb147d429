//! Document editor integration handlers.
//!
//! The editor fetches documents through a presigned link and posts a
//! callback whenever a document is saved. Neither route takes a bearer
//! token; the editor authenticates by knowing the key.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use filegate_object::client::ObjectStoreClient;

use crate::extract::{Json, Path};
use crate::handler::Result;
use crate::handler::request::DocumentCallback;
use crate::handler::response::{CallbackAck, DownloadLink};
use crate::service::{DocumentFetcher, LinkExpiry, ServiceState};

/// Tracing target for document editor operations.
const TRACING_TARGET: &str = "filegate_server::handler::documents";

/// Returns a presigned GET link the editor opens the document with.
#[tracing::instrument(skip_all, fields(file_key = %file_key))]
async fn document_link(
    State(objects): State<ObjectStoreClient>,
    State(link_expiry): State<LinkExpiry>,
    Path(file_key): Path<String>,
) -> Result<Json<DownloadLink>> {
    let url = objects.presign_get(&file_key, *link_expiry).await?;
    Ok(Json(url.into()))
}

/// Handles a save callback from the editor.
///
/// Only the save statuses carry a document; every other status is
/// acknowledged without touching the store. The saved copy replaces the
/// stored object and keeps its content type.
#[tracing::instrument(skip_all, fields(file_key = %file_key, status = callback.status))]
async fn save_document(
    State(objects): State<ObjectStoreClient>,
    State(documents): State<DocumentFetcher>,
    Path(file_key): Path<String>,
    Json(callback): Json<DocumentCallback>,
) -> CallbackAck {
    if !callback.has_document() {
        tracing::debug!(target: TRACING_TARGET, "Callback without a document");
        return CallbackAck::OK;
    }

    match store_document(&objects, &documents, &file_key, callback.url.as_deref()).await {
        Ok(size) => {
            tracing::info!(target: TRACING_TARGET, size, "Document saved");
            CallbackAck::OK
        }
        Err(err) => {
            tracing::error!(target: TRACING_TARGET, error = %err, "Failed to save document");
            CallbackAck::failed(err.message().to_owned())
        }
    }
}

async fn store_document(
    objects: &ObjectStoreClient,
    documents: &DocumentFetcher,
    file_key: &str,
    url: Option<&str>,
) -> crate::Result<usize> {
    let url = url.ok_or_else(|| crate::Error::malformed_request("Callback has no document url"))?;

    let data = documents.fetch(url).await?;
    let content_type = objects.content_type(file_key).await?;

    let size = data.len();
    objects.put(file_key, data, content_type.as_deref()).await?;
    Ok(size)
}

/// Returns a [`Router`] with all document editor routes.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/document/{file_key}", get(document_link).post(save_document))
}
