use codechat_core::ResolvedFile;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query string of `GET /files/fetch`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FetchFileParams {
    /// URL-encoded path relative to the project root.
    pub file: Option<String>,
}

/// Response body of `GET /files/fetch`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FileResponse {
    /// Full file contents.
    pub content: String,
    /// Language label from the extension table.
    pub language: String,
    /// Base name of the file.
    pub name: String,
    /// Lowercase extension without the dot.
    pub extension: String,
}

impl From<ResolvedFile> for FileResponse {
    fn from(f: ResolvedFile) -> Self {
        Self {
            content: f.content,
            language: f.language,
            name: f.name,
            extension: f.extension,
        }
    }
}
