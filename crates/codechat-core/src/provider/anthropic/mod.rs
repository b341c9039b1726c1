//! Anthropic Messages API provider.

mod provider;
mod stream;
mod types;

pub use provider::{AnthropicConfig, AnthropicProvider};
