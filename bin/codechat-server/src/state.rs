//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use codechat_core::Gateway;

use crate::config::Config;

/// State shared across all HTTP handlers. Immutable after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// File fetch and chat relay components.
    pub gateway: Arc<Gateway>,
}
