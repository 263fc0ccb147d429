use std::borrow::Cow;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Acknowledgement returned to the document editor.
///
/// The editor only reads the numeric `error` field: `0` means the callback
/// was handled, `1` means it failed and will be retried by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackAck {
    pub error: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Cow<'static, str>>,
}

impl CallbackAck {
    /// The callback was handled.
    pub const OK: Self = Self {
        error: 0,
        message: None,
    };

    /// The callback failed with the given message.
    pub fn failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            error: 1,
            message: Some(message.into()),
        }
    }

    fn status(&self) -> StatusCode {
        if self.error == 0 {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for CallbackAck {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
