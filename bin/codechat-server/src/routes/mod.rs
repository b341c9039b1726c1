//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, per-request trace-ID injection)
//! - Optional OpenAPI document (disable with `CODECHAT_ENABLE_DOCS=false`)
//! - Health / heartbeat route
//! - `POST /chat` and `GET /files/fetch`

pub mod chat;
pub mod doc;
pub mod files;
mod health;

use axum::{middleware, routing::get, Json, Router};
use crate::error::ServerError;
use crate::middleware::{cors, trace};
use crate::state::AppState;
use std::sync::Arc;
use tower::ServiceBuilder;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .merge(health::router())
        .merge(chat::router())
        .merge(files::router());

    if state.config.enable_docs {
        app = app.route("/api-docs/openapi.json", get(|| async { Json(doc::get_docs()) }));
    }

    app.fallback(|| async { ServerError::NotFound })
        // Outermost layers execute first on the way in.
        .layer(ServiceBuilder::new().layer(cors::cors_layer(state.clone())))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            trace::trace_middleware,
        ))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use codechat_core::provider::{ChatProvider, CompletionRequest, TextStream};
    use codechat_core::{ConversationTurn, Gateway, GatewayConfig, ProviderError};
    use futures::StreamExt;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use tower::ServiceExt;

    /// Streams fixed chunks and records each request.
    struct FakeProvider {
        chunks: Vec<&'static str>,
        fail: bool,
        /// Emitted as the first stream item, before any chunk.
        stream_error: Option<&'static str>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    #[async_trait]
    impl ChatProvider for FakeProvider {
        fn provider_id(&self) -> &str {
            "fake"
        }

        async fn stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
            self.seen.lock().unwrap().push(request);
            if self.fail {
                return Err(ProviderError::Api {
                    provider: "fake".into(),
                    status: 529,
                    message: "overloaded".into(),
                });
            }
            let items: Vec<Result<String, ProviderError>> = self
                .stream_error
                .map(|e| Err(ProviderError::stream_error(e)))
                .into_iter()
                .chain(self.chunks.iter().map(|c| Ok(c.to_string())))
                .collect();
            Ok(futures::stream::iter(items).boxed())
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        app: Router,
        provider: Arc<FakeProvider>,
    }

    fn harness_with(chunks: Vec<&'static str>, fail: bool) -> Harness {
        harness_from(FakeProvider {
            chunks,
            fail,
            stream_error: None,
            seen: Mutex::new(Vec::new()),
        })
    }

    fn harness_from(provider: FakeProvider) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.ts"), "export const answer = 42;\n").unwrap();
        std::fs::write(dir.path().join("image.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let provider = Arc::new(provider);
        let config = Config::for_tests(dir.path());
        let gateway = Gateway::new(GatewayConfig::new(dir.path()), provider.clone()).unwrap();
        let state = Arc::new(AppState {
            config: Arc::new(config),
            gateway: Arc::new(gateway),
        });

        Harness { dir, app: build(state), provider }
    }

    fn harness() -> Harness {
        harness_with(vec!["Hello", ", world"], false)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_chat(app: &Router, body: Value) -> axum::response::Response {
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        app.clone().oneshot(req).await.unwrap()
    }

    // ── GET /files/fetch ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_returns_file_with_language() {
        let h = harness();
        let (status, body) = get(&h.app, "/files/fetch?file=main.ts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "content": "export const answer = 42;\n",
                "language": "typescript",
                "name": "main.ts",
                "extension": "ts",
            })
        );
    }

    #[tokio::test]
    async fn fetch_is_idempotent() {
        let h = harness();
        let first = get(&h.app, "/files/fetch?file=main.ts").await;
        let second = get(&h.app, "/files/fetch?file=main.ts").await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fetch_without_file_is_400() {
        let h = harness();
        for uri in ["/files/fetch", "/files/fetch?file="] {
            let (status, body) = get(&h.app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({ "error": "File path is required" }));
        }
    }

    #[tokio::test]
    async fn fetch_traversal_is_rejected() {
        let h = harness();
        let (status, body) = get(&h.app, "/files/fetch?file=..%2F..%2Fetc%2Fpasswd").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("outside the project root"));
    }

    #[tokio::test]
    async fn fetch_unsupported_type_is_415() {
        let h = harness();
        let (status, body) = get(&h.app, "/files/fetch?file=image.png").await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body, json!({ "error": "Unsupported file type" }));
    }

    #[tokio::test]
    async fn fetch_missing_file_is_404() {
        let h = harness();
        let (status, body) = get(&h.app, "/files/fetch?file=src%2Fmissing.ts").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "File not found" }));
    }

    // ── POST /chat ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn chat_streams_text_parts() {
        let h = harness();
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(resp.headers()[chat::DATA_STREAM_HEADER], "v1");

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"0:\"Hello\"\n0:\", world\"\n");
    }

    #[tokio::test]
    async fn chat_drops_leading_assistant_turn() {
        let h = harness();
        let resp = post_chat(
            &h.app,
            json!({ "messages": [
                { "role": "assistant", "content": "How can I help?" },
                { "role": "user", "content": "Explain this" },
            ] }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let _ = resp.into_body().collect().await.unwrap();

        let seen = h.provider.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].messages, vec![ConversationTurn::user("Explain this")]);
        assert_eq!(seen[0].system, None);
    }

    #[tokio::test]
    async fn chat_with_file_sends_file_as_system_message() {
        let h = harness();
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "user", "content": "what is answer?" }], "file": "main.ts" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let _ = resp.into_body().collect().await.unwrap();

        let seen = h.provider.seen.lock().unwrap();
        let system = seen[0].system.as_deref().expect("system message");
        assert!(system.contains("export const answer = 42;"));
    }

    #[tokio::test]
    async fn chat_with_missing_file_is_500_json() {
        let h = harness();
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "user", "content": "hi" }], "file": "gone.ts" }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
        assert!(h.provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_provider_failure_is_500_json() {
        let h = harness_with(vec![], true);
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "The model provider request failed" }));
    }

    #[tokio::test]
    async fn chat_error_before_first_chunk_is_500_json() {
        let h = harness_from(FakeProvider {
            chunks: vec!["never sent"],
            fail: false,
            stream_error: Some("overloaded_error: Overloaded"),
            seen: Mutex::new(Vec::new()),
        });
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "user", "content": "hi" }] }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "The model provider request failed" }));
    }

    #[tokio::test]
    async fn chat_malformed_body_is_400_json() {
        let h = harness();
        let bodies = [
            r#"{"messages":[{"role":"tool","content":"x"}]}"#,
            "not json",
            r#"{"file":"a.ts"}"#,
        ];
        for raw in bodies {
            let req = Request::builder()
                .method("POST")
                .uri("/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(raw))
                .unwrap();
            let resp = h.app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{raw}");
            assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json", "{raw}");
            let bytes = resp.into_body().collect().await.unwrap().to_bytes();
            let body: Value = serde_json::from_slice(&bytes).unwrap();
            assert!(body["error"].is_string(), "{raw}");
        }
        assert!(h.provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_without_json_content_type_is_400_json() {
        let h = harness();
        let req = Request::builder()
            .method("POST")
            .uri("/chat")
            .body(Body::from(r#"{"messages":[]}"#))
            .unwrap();
        let resp = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Missing Content-Type: application/json header" }));
    }

    #[tokio::test]
    async fn chat_with_only_assistant_turn_is_400() {
        let h = harness();
        let resp = post_chat(
            &h.app,
            json!({ "messages": [{ "role": "assistant", "content": "Hi there" }] }),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(h.provider.seen.lock().unwrap().is_empty());
    }

    // ── Misc ──────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let h = harness();
        let (status, body) = get(&h.app, "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "not found" }));
    }

    #[tokio::test]
    async fn health_reports_provider_and_root() {
        let h = harness();
        let (status, body) = get(&h.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["provider"], "fake");
        let root = h.dir.path().canonicalize().unwrap();
        assert_eq!(body["project_root"], root.display().to_string());
        assert!(!body["version"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn responses_carry_trace_id() {
        let h = harness();
        let id = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";
        let req = Request::builder()
            .uri("/health")
            .header(trace::X_TRACE_ID, id)
            .body(Body::empty())
            .unwrap();
        let resp = h.app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.headers()[trace::X_TRACE_ID], id);
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let h = harness();
        let (status, body) = get(&h.app, "/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/chat"].is_object());
        assert!(body["paths"]["/files/fetch"].is_object());
    }
}
