//! HTTP request / response bodies.

pub mod chat;
pub mod files;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error message.
    pub error: String,
}

/// `GET /health` response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Identifier of the model provider chats are relayed to.
    pub provider: String,
    /// Canonical project root file reads are confined to.
    pub project_root: String,
}
