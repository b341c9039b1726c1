//! codechat-core – request gateway for an in-editor coding assistant.
//!
//! Two flows share the components in this crate:
//! - file fetch: [`fetch::FileFetchService`] decodes the caller's path,
//!   confines it to the project root ([`path::PathResolver`]), classifies
//!   it ([`extensions::ExtensionTable`]) and reads it;
//! - chat: [`prompt::SystemPromptBuilder`] optionally turns a target file
//!   into a system message, then [`relay::ChatRelay`] forwards the
//!   conversation to a [`provider::ChatProvider`] and streams the reply.
//!
//! [`gateway::Gateway`] wires both flows together for the HTTP server.

pub mod error;
pub mod extensions;
pub mod fetch;
pub mod gateway;
pub mod path;
pub mod prompt;
pub mod provider;
pub mod relay;
pub mod types;

pub use error::{GatewayError, ProviderError, Result};
pub use gateway::{Gateway, GatewayConfig};
pub use relay::{Completion, CompletionHook, LoggingHook, NoopHook, RelayStream};
pub use types::{ConversationHistory, ConversationTurn, FileQuery, ResolvedFile, Role};
