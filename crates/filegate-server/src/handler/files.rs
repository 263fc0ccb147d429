//! Object upload, download and deletion handlers.
//!
//! Every route here sits behind bearer authentication. Keys are caller keys;
//! the object client qualifies them with the bucket prefix.

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum_extra::response::Attachment;
use bytes::Bytes;
use filegate_object::client::ObjectStoreClient;

use crate::extract::{Json, Multipart, Path};
use crate::handler::request::ArchiveFolder;
use crate::handler::response::DownloadLink;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::{ArchiveRequest, ArchiveService, LinkExpiry, ServiceState};

/// Tracing target for file operations.
const TRACING_TARGET: &str = "filegate_server::handler::files";

/// Stores the multipart `file` field under the key given in `fileId`.
///
/// Form data:
/// - `file`: the content, stored with the part's content type
/// - `fileId`: caller key of the object
#[tracing::instrument(skip_all)]
async fn upload_file(
    State(objects): State<ObjectStoreClient>,
    Multipart(mut multipart): Multipart,
) -> Result<&'static str> {
    let mut file: Option<(Bytes, Option<String>)> = None;
    let mut file_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let content_type = field.content_type().map(str::to_owned);
                let data = field.bytes().await.map_err(multipart_error)?;
                file = Some((data, content_type));
            }
            Some("fileId") => {
                file_id = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {
                tracing::debug!(target: TRACING_TARGET, field = ?name, "Skipping unknown field");
            }
        }
    }

    let Some((data, content_type)) = file else {
        return Err(ErrorKind::BadRequest.with_message("No file uploaded"));
    };
    let file_id = file_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ErrorKind::BadRequest.with_message("No fileId provided"))?;

    let size = data.len();
    objects.put(&file_id, data, content_type.as_deref()).await?;

    tracing::info!(
        target: TRACING_TARGET,
        file_id = %file_id,
        size,
        content_type = content_type.as_deref().unwrap_or_default(),
        "File uploaded"
    );

    Ok("File uploaded successfully!")
}

fn multipart_error(err: MultipartError) -> Error<'static> {
    tracing::warn!(target: TRACING_TARGET, error = %err, "Failed to read multipart field");

    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ErrorKind::BadRequest
            .with_message("File too large")
            .with_context(err.body_text());
    }

    ErrorKind::BadRequest
        .with_message("Invalid multipart data")
        .with_context(err.body_text())
}

/// Streams the listed objects back as one zip file.
///
/// The response starts once the first entry is open; a failure after that
/// ends the body early and the client receives a truncated archive.
#[tracing::instrument(skip_all, fields(entries = request.files.as_ref().map_or(0, Vec::len)))]
async fn download_folder(
    State(archive): State<ArchiveService>,
    Json(request): Json<ArchiveFolder>,
) -> Result<impl IntoResponse> {
    let file_name = request.file_name();
    let archive_request = ArchiveRequest::new(request.entries())?;
    let stream = archive.assemble(archive_request).await?;

    tracing::info!(
        target: TRACING_TARGET,
        file_name = %file_name,
        "Archive download started"
    );

    let response = Attachment::new(Body::from_stream(stream))
        .filename(file_name)
        .content_type("application/zip");

    Ok(response)
}

/// Returns a presigned GET link for one object.
///
/// The object is not checked for existence; a link to a missing key fails
/// when it is used.
#[tracing::instrument(skip_all, fields(file_key = %file_key))]
async fn download_link(
    State(objects): State<ObjectStoreClient>,
    State(link_expiry): State<LinkExpiry>,
    Path(file_key): Path<String>,
) -> Result<Json<DownloadLink>> {
    let url = objects.presign_get(&file_key, *link_expiry).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        expires_secs = link_expiry.as_secs(),
        "Download link created"
    );

    Ok(Json(url.into()))
}

#[tracing::instrument(skip_all, fields(file_key = %file_key))]
async fn delete_file(
    State(objects): State<ObjectStoreClient>,
    Path(file_key): Path<String>,
) -> Result<&'static str> {
    objects.delete(&file_key).await?;

    tracing::info!(target: TRACING_TARGET, file_key = %file_key, "File deleted");
    Ok("File deleted successfully")
}

/// Returns a [`Router`] with all file routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/upload", post(upload_file))
        .route("/download/folder", post(download_folder))
        .route("/download/{file_key}", get(download_link))
        .route("/delete/{file_key}", delete(delete_file))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};

    use super::*;
    use crate::handler::test::{
        bearer, create_test_server, create_test_server_with_state, create_test_state,
    };
    use crate::service::ArchiveOptions;
    use crate::service::testing::{FakeReader, read_archive};

    fn upload_form(file_id: Option<&str>, content: &'static [u8]) -> MultipartForm {
        let part = Part::bytes(content).file_name("a.txt").mime_type("text/plain");
        let form = MultipartForm::new().add_part("file", part);
        match file_id {
            Some(id) => form.add_text("fileId", id),
            None => form,
        }
    }

    #[tokio::test]
    async fn missing_token_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server.get("/download/k1").expect_failure().await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["message"], "Unauthorized: No token provided");
        Ok(())
    }

    #[tokio::test]
    async fn malformed_header_is_rejected() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server
            .delete("/delete/k1")
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .expect_failure()
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["message"], "Unauthorized: No token provided");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_token_never_reaches_the_store() -> anyhow::Result<()> {
        let (server, state) = create_test_server()?;

        let response = server
            .post("/upload")
            .add_header("authorization", "Bearer not-a-jwt")
            .multipart(upload_form(Some("k1"), b"hello"))
            .expect_failure()
            .await;
        response.assert_status_unauthorized();
        let body: Value = response.json();
        assert_eq!(body["message"], "Unauthorized: Invalid token");

        assert!(state.objects.head("k1").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn rejected_archive_opens_nothing() -> anyhow::Result<()> {
        let reader = Arc::new(FakeReader::new().with_object("k1", vec![Bytes::from("a")]));
        let state = create_test_state()
            .with_archive(ArchiveService::new(reader.clone(), ArchiveOptions::default()));
        let server = create_test_server_with_state(state)?;

        let response = server
            .post("/download/folder")
            .add_header("authorization", "Bearer not-a-jwt")
            .json(&json!({ "files": [["k1", "a.txt"]], "folderName": "x" }))
            .expect_failure()
            .await;
        response.assert_status_unauthorized();
        assert_eq!(reader.opens(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn upload_stores_content_and_type() -> anyhow::Result<()> {
        let (server, state) = create_test_server()?;

        let response = server
            .post("/upload")
            .add_header("authorization", bearer("user-1"))
            .multipart(upload_form(Some("k1"), b"hello"))
            .await;
        response.assert_status_ok();
        response.assert_text("File uploaded successfully!");

        let stored = state.objects.get("k1").await?;
        assert_eq!(stored.data, Bytes::from("hello"));
        assert_eq!(stored.content_type.as_deref(), Some("text/plain"));
        Ok(())
    }

    #[tokio::test]
    async fn upload_requires_file_and_id() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server
            .post("/upload")
            .add_header("authorization", bearer("user-1"))
            .multipart(upload_form(None, b"hello"))
            .expect_failure()
            .await;
        response.assert_status_bad_request();

        let response = server
            .post("/upload")
            .add_header("authorization", bearer("user-1"))
            .multipart(MultipartForm::new().add_text("fileId", "k1"))
            .expect_failure()
            .await;
        response.assert_status_bad_request();
        let body: Value = response.json();
        assert_eq!(body["message"], "No file uploaded");
        Ok(())
    }

    #[tokio::test]
    async fn folder_download_streams_a_zip() -> anyhow::Result<()> {
        let (server, state) = create_test_server()?;
        state.objects.put("k1", Bytes::from("alpha"), None).await?;
        state.objects.put("k2", Bytes::from("beta"), None).await?;

        let response = server
            .post("/download/folder")
            .add_header("authorization", bearer("user-1"))
            .json(&json!({
                "files": [["k1", "a.txt"], ["k2", "b.txt"]],
                "folderName": "reports",
            }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "application/zip");
        let disposition = response.header("content-disposition");
        let disposition = disposition.to_str()?;
        assert!(disposition.starts_with("attachment"));
        assert!(disposition.contains("reports.zip"));

        let entries = read_archive(response.as_bytes().to_vec()).await;
        assert_eq!(
            entries,
            [
                ("a.txt".to_owned(), b"alpha".to_vec()),
                ("b.txt".to_owned(), b"beta".to_vec()),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_folder_is_a_bad_request() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        for body in [json!({ "files": [], "folderName": "x" }), json!({ "folderName": "x" })] {
            let response = server
                .post("/download/folder")
                .add_header("authorization", bearer("user-1"))
                .json(&body)
                .expect_failure()
                .await;
            response.assert_status_bad_request();
            let body: Value = response.json();
            assert_eq!(body["message"], "No files provided");
        }
        Ok(())
    }

    #[tokio::test]
    async fn missing_first_entry_is_not_found() -> anyhow::Result<()> {
        let (server, state) = create_test_server()?;
        state.objects.put("k2", Bytes::from("beta"), None).await?;

        let response = server
            .post("/download/folder")
            .add_header("authorization", bearer("user-1"))
            .json(&json!({ "files": [["gone", "a.txt"], ["k2", "b.txt"]] }))
            .expect_failure()
            .await;
        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["resource"], "gone");
        Ok(())
    }

    #[tokio::test]
    async fn download_link_is_presigned() -> anyhow::Result<()> {
        let (server, _) = create_test_server()?;

        let response = server
            .get("/download/k1")
            .add_header("authorization", bearer("user-1"))
            .await;
        response.assert_status_ok();

        let link: DownloadLink = response.json();
        assert_eq!(link.url.path(), "/uploads/k1");
        assert_eq!(link.url.query(), Some("X-Amz-Expires=60"));
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_once() -> anyhow::Result<()> {
        let (server, state) = create_test_server()?;
        state.objects.put("k1", Bytes::from("alpha"), None).await?;

        let response = server
            .delete("/delete/k1")
            .add_header("authorization", bearer("user-1"))
            .await;
        response.assert_status_ok();
        response.assert_text("File deleted successfully");

        let response = server
            .delete("/delete/k1")
            .add_header("authorization", bearer("user-1"))
            .expect_failure()
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["message"], "File not found");
        Ok(())
    }
}
