//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON `{ "error": … }` response with an appropriate status code.
//!
//! **Security note:** server-side failures (read errors, provider errors)
//! are logged with full detail but only a fixed message is returned, so
//! absolute paths and upstream API bodies never reach clients.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use codechat_core::GatewayError;
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// All errors that can occur in the codechat-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Propagated from the request gateway.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// No route matched.
    #[error("not found")]
    NotFound,
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Missing Content-Type: application/json header".to_owned()
            }
            other => other.body_text(),
        };
        ServerError::BadRequest(message)
    }
}

impl ServerError {
    /// Status code and client-facing message.
    fn parts(&self) -> (StatusCode, String) {
        match self {
            ServerError::NotFound => (StatusCode::NOT_FOUND, "not found".to_owned()),
            ServerError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ServerError::Gateway(e) => match e {
                // Client-facing errors: expose the message directly.
                GatewayError::MissingParameter => (StatusCode::BAD_REQUEST, e.to_string()),
                GatewayError::InvalidPath { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
                GatewayError::EmptyConversation => (StatusCode::BAD_REQUEST, e.to_string()),
                GatewayError::UnsupportedExtension { .. } => {
                    (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
                }
                GatewayError::FileNotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),

                // Internal errors: log the full detail, keep the body generic.
                GatewayError::ReadError { .. } => {
                    error!(error = %e, "file read failed");
                    (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read file".to_owned())
                }
                GatewayError::FileUnavailable { file, source } => {
                    warn!(file = %file, error = %source, "system prompt could not be built");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("File {file:?} could not be loaded for the chat"),
                    )
                }
                GatewayError::Provider(p) => {
                    error!(error = %p, "model provider error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "The model provider request failed".to_owned(),
                    )
                }
            },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = self.parts();
        (status, Json(json!({ "error": client_message }))).into_response()
    }
}
