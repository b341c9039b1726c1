//! System prompt builder for chats that target a project file.

use std::sync::Arc;

use crate::error::{GatewayError, Result};
use crate::fetch::FileSource;
use crate::types::ResolvedFile;

/// Builds the system instruction sent with a file-scoped chat.
#[derive(Clone)]
pub struct SystemPromptBuilder {
    source: Arc<dyn FileSource>,
}

impl std::fmt::Debug for SystemPromptBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemPromptBuilder").finish_non_exhaustive()
    }
}

impl SystemPromptBuilder {
    pub fn new(source: Arc<dyn FileSource>) -> Self {
        Self { source }
    }

    /// Load `file` and format it into a system message.
    ///
    /// Any failure to load the file is reported as
    /// [`GatewayError::FileUnavailable`]; the chat is never sent without it.
    pub async fn build_system_message(&self, file: &str) -> Result<String> {
        let resolved = self
            .source
            .load(file)
            .await
            .map_err(|e| GatewayError::FileUnavailable {
                file: file.to_owned(),
                source: Box::new(e),
            })?;
        Ok(render(file, &resolved))
    }
}

fn render(identifier: &str, file: &ResolvedFile) -> String {
    let fence = fence_for(&file.content);
    format!(
        "You are an expert {language} programmer helping a developer inside their code editor.\n\
         The developer is working on the file `{identifier}` ({language}). \
         Its current contents are:\n\n\
         {fence}{extension}\n{content}\n{fence}\n\n\
         Answer questions about this file and keep your suggestions consistent with its existing style. \
         When you propose changes, reply with the complete updated file in a single fenced code block.",
        language = file.language,
        extension = file.extension,
        content = file.content.trim_end_matches('\n'),
    )
}

/// A backtick fence longer than any run of backticks inside `content`.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in content.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat(longest.max(2) + 1)
}
