//! Request-scoped data carried between the gateway components.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// One message of a chat exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct ConversationTurn {
    /// `"user"`, `"assistant"` or `"system"`.
    pub role: Role,
    /// Plain-text message body.
    pub content: String,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Turns in conversation order.
pub type ConversationHistory = Vec<ConversationTurn>;

/// Caller-supplied file lookup. `path` is untrusted and may still be URL-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileQuery {
    pub path: String,
}

impl FileQuery {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A file that passed every check and was read, alive for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    /// Canonical path inside the project root.
    pub absolute_path: PathBuf,
    /// Lowercase extension without the leading dot.
    pub extension: String,
    /// Label from the extension table, e.g. `"typescript"`.
    pub language: String,
    /// Base name of the file.
    pub name: String,
    /// Full file contents.
    pub content: String,
}
