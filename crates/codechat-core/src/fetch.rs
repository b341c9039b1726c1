//! File fetch service: decode → resolve → classify → read.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use tracing::{debug, instrument};

use crate::error::{GatewayError, Result};
use crate::extensions::ExtensionTable;
use crate::path::PathResolver;
use crate::types::{FileQuery, ResolvedFile};

/// Something that can load a project file by its identifier.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Load `identifier` (already decoded, relative to the project root).
    async fn load(&self, identifier: &str) -> Result<ResolvedFile>;
}

/// Answers file-content queries for the fetch endpoint.
#[derive(Debug, Clone)]
pub struct FileFetchService {
    resolver: PathResolver,
    extensions: Arc<ExtensionTable>,
}

impl FileFetchService {
    pub fn new(resolver: PathResolver, extensions: Arc<ExtensionTable>) -> Self {
        Self { resolver, extensions }
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Answer a caller query. Each step short-circuits on failure.
    #[instrument(skip(self, query), fields(path = %query.path))]
    pub async fn fetch(&self, query: &FileQuery) -> Result<ResolvedFile> {
        if query.path.trim().is_empty() {
            return Err(GatewayError::MissingParameter);
        }

        let decoded = percent_decode_str(&query.path)
            .decode_utf8()
            .map_err(|e| GatewayError::invalid_path(format!("path is not valid UTF-8: {e}")))?;

        self.read(&decoded).await
    }

    /// Resolve, classify and read an already-decoded path.
    pub async fn read(&self, raw: &str) -> Result<ResolvedFile> {
        let absolute_path = self.resolver.resolve(raw)?;
        let classification = self.extensions.classify(&absolute_path)?;

        let content = match tokio::fs::read_to_string(&absolute_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(GatewayError::FileNotFound { path: absolute_path });
            }
            Err(source) => {
                return Err(GatewayError::ReadError { path: absolute_path, source });
            }
        };

        let name = absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        debug!(
            path = %absolute_path.display(),
            language = %classification.language,
            bytes = content.len(),
            "file read"
        );

        Ok(ResolvedFile {
            absolute_path,
            extension: classification.extension,
            language: classification.language,
            name,
            content,
        })
    }
}

#[async_trait]
impl FileSource for FileFetchService {
    async fn load(&self, identifier: &str) -> Result<ResolvedFile> {
        self.read(identifier).await
    }
}
