//! Model provider abstraction and the Anthropic Messages API client.

pub mod anthropic;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::ProviderError;
use crate::types::ConversationTurn;

pub use anthropic::{AnthropicConfig, AnthropicProvider};

/// Incremental text deltas, in the order the provider emitted them.
pub type TextStream = BoxStream<'static, Result<String, ProviderError>>;

/// A chat completion to stream from a provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionRequest {
    /// System instruction, if any.
    pub system: Option<String>,
    /// Conversation turns in order. Never starts with an assistant turn.
    pub messages: Vec<ConversationTurn>,
}

/// External text-generation service.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short identifier used in logs.
    fn provider_id(&self) -> &str;

    /// Start a streaming completion.
    ///
    /// Failures that happen before any output exists must be returned here
    /// rather than as the first stream item.
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, ProviderError>;
}
