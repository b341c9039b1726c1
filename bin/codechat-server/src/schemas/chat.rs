use codechat_core::ConversationTurn;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    /// Conversation so far, oldest first. A leading assistant turn is dropped.
    pub messages: Vec<ConversationTurn>,
    /// Project file the conversation is about, relative to the project root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}
