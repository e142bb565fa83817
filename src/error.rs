use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

/// Errors a request can surface to the client. Everything serializes as the
/// uniform `{"ok": false, "error": "..."}` envelope with the matching HTTP
/// status; model output that merely fails to parse is never one of these
/// (it is absorbed by recovery in `recover.rs`).
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request: bad JSON body, missing/invalid image data.
    #[error("{0}")]
    BadRequest(String),

    /// Server-side configuration is incomplete (missing API credential).
    #[error("Missing {0}")]
    MissingConfig(&'static str),

    /// The upstream model call failed (transport, auth, policy, rate limit).
    /// The message is forwarded to the client verbatim.
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingConfig(_) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "ok": false, "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
