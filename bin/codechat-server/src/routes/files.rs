//! Project file access.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use codechat_core::FileQuery;
use tracing::info;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::files::{FetchFileParams, FileResponse};
use crate::schemas::ErrorBody;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(fetch_file), components(schemas(FileResponse, ErrorBody)))]
pub struct FilesApi;

/// Register file routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/files/fetch", get(fetch_file))
}

/// Read a project file (`GET /files/fetch?file=<path>`).
#[utoipa::path(
    get,
    path = "/files/fetch",
    tag = "files",
    params(FetchFileParams),
    responses(
        (status = 200, description = "File contents", body = FileResponse),
        (status = 400, description = "Missing or invalid path", body = ErrorBody),
        (status = 404, description = "File not found", body = ErrorBody),
        (status = 415, description = "Unsupported file type", body = ErrorBody),
        (status = 500, description = "Read failure", body = ErrorBody),
    )
)]
pub async fn fetch_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchFileParams>,
) -> Result<Json<FileResponse>, ServerError> {
    let query = FileQuery::new(params.file.unwrap_or_default());
    let file = state.gateway.fetch_file(&query).await?;

    info!(name = %file.name, language = %file.language, bytes = file.content.len(), "file fetched");
    Ok(Json(file.into()))
}
