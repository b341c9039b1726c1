//! Chat relay: normalize the history, dispatch to the provider, and pump
//! its output to the caller through a bounded channel.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::{stream, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, warn};

use crate::error::{GatewayError, Result};
use crate::provider::{ChatProvider, CompletionRequest, TextStream};
use crate::types::{ConversationHistory, Role};

/// Chunks buffered between the provider task and the HTTP body.
const RELAY_BUFFER: usize = 32;

/// Drop a single leading assistant turn.
///
/// The upstream API requires the conversation to open with a non-assistant
/// turn. At most one turn is removed.
pub fn normalize_history(mut history: ConversationHistory) -> ConversationHistory {
    if history.first().is_some_and(|t| t.role == Role::Assistant) {
        history.remove(0);
    }
    history
}

/// Full output of a finished completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// File the chat was about, if any.
    pub file: Option<String>,
    /// Concatenation of every streamed chunk.
    pub text: String,
}

/// Post-processing run once a stream completes normally.
///
/// Implementations cannot fail the request: the caller has already received
/// the whole response when this runs.
pub trait CompletionHook: Send + Sync {
    fn on_complete(&self, completion: &Completion);
}

/// Does nothing. The default hook.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl CompletionHook for NoopHook {
    fn on_complete(&self, _completion: &Completion) {}
}

/// Logs generated text at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHook;

impl CompletionHook for LoggingHook {
    fn on_complete(&self, completion: &Completion) {
        debug!(
            file = completion.file.as_deref().unwrap_or("-"),
            text = %completion.text,
            "generated text"
        );
    }
}

/// Text chunks for one relayed chat, in provider order.
///
/// Dropping it closes the channel, which makes the producer task abandon
/// the upstream request.
pub struct RelayStream {
    inner: ReceiverStream<String>,
}

impl RelayStream {
    fn new(rx: mpsc::Receiver<String>) -> Self {
        Self { inner: ReceiverStream::new(rx) }
    }
}

impl Stream for RelayStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

impl std::fmt::Debug for RelayStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RelayStream")
    }
}

/// Forwards conversations to a [`ChatProvider`] and streams the reply.
#[derive(Clone)]
pub struct ChatRelay {
    provider: Arc<dyn ChatProvider>,
    hook: Arc<dyn CompletionHook>,
}

impl std::fmt::Debug for ChatRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRelay")
            .field("provider", &self.provider.provider_id())
            .finish_non_exhaustive()
    }
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self { provider, hook: Arc::new(NoopHook) }
    }

    pub fn with_hook(mut self, hook: Arc<dyn CompletionHook>) -> Self {
        self.hook = hook;
        self
    }

    pub fn provider_id(&self) -> &str {
        self.provider.provider_id()
    }

    /// Relay `history` (plus an optional system message) to the provider.
    ///
    /// Returns once the provider produced its first item; provider failures
    /// up to and including that item are returned as
    /// [`GatewayError::Provider`]. Later failures end the stream early.
    pub async fn relay(
        &self,
        history: ConversationHistory,
        system: Option<String>,
        file: Option<String>,
    ) -> Result<RelayStream> {
        let messages = normalize_history(history);
        if messages.is_empty() {
            return Err(GatewayError::EmptyConversation);
        }

        debug!(
            provider = self.provider.provider_id(),
            turns = messages.len(),
            has_system = system.is_some(),
            "dispatching chat"
        );

        let mut upstream = self
            .provider
            .stream(CompletionRequest { system, messages })
            .await?;

        // Some providers accept the request and then report the failure as
        // their first event.
        let first = upstream.next().await;
        let upstream: TextStream = match first {
            Some(Ok(first)) => stream::iter([Ok(first)]).chain(upstream).boxed(),
            Some(Err(e)) => return Err(e.into()),
            None => stream::empty().boxed(),
        };

        let (tx, rx) = mpsc::channel(RELAY_BUFFER);
        tokio::spawn(pump(upstream, tx, Arc::clone(&self.hook), file));
        Ok(RelayStream::new(rx))
    }
}

/// Move chunks from the provider to the channel until either side ends.
async fn pump(
    mut upstream: TextStream,
    tx: mpsc::Sender<String>,
    hook: Arc<dyn CompletionHook>,
    file: Option<String>,
) {
    let mut text = String::new();
    let mut chunks = 0usize;

    loop {
        let next = tokio::select! {
            _ = tx.closed() => {
                info!(chunks, "caller disconnected; abandoning provider stream");
                return;
            }
            next = upstream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                text.push_str(&chunk);
                chunks += 1;
                if tx.send(chunk).await.is_err() {
                    info!(chunks, "caller disconnected; abandoning provider stream");
                    return;
                }
            }
            Some(Err(e)) => {
                warn!(error = %e, chunks, "provider stream failed mid-response");
                return;
            }
            None => break,
        }
    }

    info!(chunks, chars = text.len(), "chat stream complete");
    hook.on_complete(&Completion { file, text });
}
