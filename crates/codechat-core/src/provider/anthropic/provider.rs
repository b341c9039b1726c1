//! Anthropic provider implementation

use async_trait::async_trait;
use reqwest::Client;
use reqwest_eventsource::{EventSource, retry::Never};
use tracing::debug;

use super::stream::open_stream;
use super::types::{MessageParam, MessagesRequest};
use crate::error::ProviderError;
use crate::provider::{ChatProvider, CompletionRequest, TextStream};
use crate::types::Role;

/// Connection and generation settings for [`AnthropicProvider`].
#[derive(Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl AnthropicConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.anthropic.com";
    pub const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-20240620";
    pub const DEFAULT_MAX_TOKENS: u32 = 4096;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
            model: Self::DEFAULT_MODEL.to_owned(),
            max_tokens: Self::DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Streams completions from the Anthropic Messages API.
#[derive(Debug)]
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Environment variable for API key
    pub const API_KEY_ENV: &'static str = "ANTHROPIC_API_KEY";
    /// Value of the `anthropic-version` header.
    pub const API_VERSION: &'static str = "2023-06-01";

    pub fn new(config: AnthropicConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey("anthropic".to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("codechat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// Map a completion request onto the Messages API body.
    ///
    /// The API takes the system prompt as a top-level field, so any system
    /// turns in the history are appended to it instead of sent as messages.
    /// Folding can leave an assistant turn first, which the API rejects; that
    /// turn is dropped the same way the relay drops one before folding.
    pub(super) fn build_request(&self, request: &CompletionRequest) -> MessagesRequest {
        let mut system_parts: Vec<&str> = request.system.iter().map(String::as_str).collect();
        let mut messages = Vec::with_capacity(request.messages.len());

        for turn in &request.messages {
            match turn.role {
                Role::System => system_parts.push(&turn.content),
                role => messages.push(MessageParam {
                    role: role.as_str(),
                    content: turn.content.clone(),
                }),
            }
        }

        if messages.first().is_some_and(|m| m.role == Role::Assistant.as_str()) {
            debug!("dropping assistant turn left first after folding system turns");
            messages.remove(0);
        }

        let system_parts: Vec<&str> = system_parts
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .collect();

        MessagesRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: (!system_parts.is_empty()).then(|| system_parts.join("\n\n")),
            messages,
            stream: true,
        }
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn provider_id(&self) -> &str {
        "anthropic"
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError> {
        let body = self.build_request(&request);
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            has_system = body.system.is_some(),
            "opening Anthropic stream"
        );

        let req_builder = self
            .client
            .post(self.messages_url())
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", Self::API_VERSION)
            .json(&body);

        let mut event_source = EventSource::new(req_builder)
            .map_err(|e| ProviderError::stream_error(format!("Failed to create event source: {e}")))?;
        event_source.set_retry_policy(Box::new(Never));

        open_stream(event_source).await
    }
}
