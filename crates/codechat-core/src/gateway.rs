//! The request gateway: one value holding every component, built once at
//! startup and shared by all requests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::extensions::ExtensionTable;
use crate::fetch::FileFetchService;
use crate::path::PathResolver;
use crate::prompt::SystemPromptBuilder;
use crate::provider::ChatProvider;
use crate::relay::{ChatRelay, CompletionHook, RelayStream};
use crate::types::{ConversationHistory, FileQuery, ResolvedFile};

/// Immutable configuration injected at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Directory every file access is confined to.
    pub project_root: PathBuf,
    /// Extension → language table.
    pub extensions: ExtensionTable,
}

impl GatewayConfig {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            extensions: ExtensionTable::default(),
        }
    }

    pub fn with_extensions(mut self, extensions: ExtensionTable) -> Self {
        self.extensions = extensions;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    files: Arc<FileFetchService>,
    prompts: SystemPromptBuilder,
    relay: ChatRelay,
}

impl Gateway {
    /// Build the gateway. Fails if the project root cannot be canonicalized.
    pub fn new(config: GatewayConfig, provider: Arc<dyn ChatProvider>) -> io::Result<Self> {
        let resolver = PathResolver::new(&config.project_root)?;
        info!(
            root = %resolver.root().display(),
            extensions = config.extensions.len(),
            provider = provider.provider_id(),
            "gateway ready"
        );

        let files = Arc::new(FileFetchService::new(resolver, Arc::new(config.extensions)));
        let prompts = SystemPromptBuilder::new(files.clone());
        Ok(Self {
            files,
            prompts,
            relay: ChatRelay::new(provider),
        })
    }

    /// Replace the completion hook (default: [`crate::relay::NoopHook`]).
    pub fn with_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.relay = self.relay.with_hook(hook);
        self
    }

    /// Canonical directory every file access is confined to.
    pub fn project_root(&self) -> &Path {
        self.files.resolver().root()
    }

    pub fn provider_id(&self) -> &str {
        self.relay.provider_id()
    }

    /// `GET /files/fetch`.
    pub async fn fetch_file(&self, query: &FileQuery) -> Result<ResolvedFile> {
        self.files.fetch(query).await
    }

    /// `POST /chat`. A non-empty `file` adds a system message built from it.
    pub async fn chat(&self, history: ConversationHistory, file: Option<&str>) -> Result<RelayStream> {
        let file = file.filter(|f| !f.trim().is_empty());
        let system = match file {
            Some(f) => Some(self.prompts.build_system_message(f).await?),
            None => None,
        };
        self.relay
            .relay(history, system, file.map(str::to_owned))
            .await
    }
}
