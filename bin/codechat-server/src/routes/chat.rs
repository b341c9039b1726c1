//! Streaming chat route.
//!
//! The reply is written in the AI data-stream text format: one
//! `0:<json string>\n` line per provider chunk, in arrival order. Errors
//! before the first chunk are JSON error responses; errors after it simply
//! end the body.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, HeaderName, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use codechat_core::{ConversationTurn, Role};
use futures::StreamExt;
use tracing::debug;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::chat::ChatRequest;
use crate::schemas::ErrorBody;
use crate::state::AppState;

/// Marks the body as an AI data stream for client SDKs.
pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

#[derive(OpenApi)]
#[openapi(
    paths(chat),
    components(schemas(ChatRequest, ConversationTurn, Role, ErrorBody))
)]
pub struct ChatApi;

/// Register chat routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/chat", post(chat))
}

/// Stream a model reply (`POST /chat`).
///
/// When `file` is set, its contents are sent to the model as the system
/// message.
#[utoipa::path(
    post,
    path = "/chat",
    tag = "chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Streamed reply", content_type = "text/plain", body = String),
        (status = 400, description = "Malformed body or nothing to send", body = ErrorBody),
        (status = 500, description = "File or provider failure", body = ErrorBody),
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(req) = payload?;
    debug!(turns = req.messages.len(), file = ?req.file, "chat request");

    let stream = state.gateway.chat(req.messages, req.file.as_deref()).await?;
    let body = Body::from_stream(stream.map(|chunk| Ok::<_, Infallible>(text_part(&chunk))));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (HeaderName::from_static(DATA_STREAM_HEADER), HeaderValue::from_static("v1")),
        ],
        body,
    )
        .into_response())
}

/// Frame one text chunk as a data-stream text part.
pub fn text_part(chunk: &str) -> Bytes {
    let encoded = serde_json::Value::String(chunk.to_owned()).to_string();
    Bytes::from(format!("0:{encoded}\n"))
}
