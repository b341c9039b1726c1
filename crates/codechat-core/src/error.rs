use std::path::PathBuf;

use thiserror::Error;

/// Errors that end a gateway request. None of them are retried.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The `file` query parameter was absent or empty.
    #[error("File path is required")]
    MissingParameter,

    /// The path could not be resolved, or resolved outside the project root.
    #[error("invalid file path: {message}")]
    InvalidPath { message: String },

    /// The file extension is not in the extension table.
    #[error("Unsupported file type")]
    UnsupportedExtension { extension: String },

    /// The resolved path did not exist when it was read.
    #[error("File not found")]
    FileNotFound { path: PathBuf },

    /// Any other I/O failure while reading a resolved file.
    #[error("failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file named by a chat request could not be turned into a system prompt.
    #[error("file {file:?} is unavailable for the system prompt: {source}")]
    FileUnavailable {
        file: String,
        #[source]
        source: Box<GatewayError>,
    },

    /// Nothing left to send once the leading assistant turn was dropped.
    #[error("conversation must contain at least one non-assistant-led turn")]
    EmptyConversation,

    /// The model provider failed before any output was streamed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl GatewayError {
    pub(crate) fn invalid_path(message: impl Into<String>) -> Self {
        GatewayError::InvalidPath { message: message.into() }
    }
}

/// Errors raised by a [`crate::provider::ChatProvider`].
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No credential was configured for the provider.
    #[error("missing API key for provider {0}")]
    MissingApiKey(String),

    /// The provider answered with a non-success status or an `error` event.
    #[error("{provider} API error {status}: {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// Transport failure talking to the provider.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The event stream broke or carried something undecodable.
    #[error("stream error: {0}")]
    Stream(String),
}

impl ProviderError {
    pub fn stream_error(message: impl Into<String>) -> Self {
        ProviderError::Stream(message.into())
    }
}

pub type Result<T, E = GatewayError> = std::result::Result<T, E>;
