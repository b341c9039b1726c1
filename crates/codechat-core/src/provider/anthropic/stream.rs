//! Anthropic streaming support
//!
//! The Messages API streams named SSE events whose `data:` payload carries a
//! `type` field:
//! - `content_block_delta` with a `text_delta` for generated text
//! - `message_delta` with the stop reason
//! - `message_stop` once the message is complete
//! - `error` for failures after the stream opened
//! - `message_start`, `content_block_start`, `content_block_stop`, `ping`

use futures::stream::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use tracing::debug;

use super::types::{ContentDelta, ErrorResponse, StreamEvent};
use crate::error::ProviderError;
use crate::provider::TextStream;

const PROVIDER: &str = "anthropic";

/// What a single decoded event means for the text stream.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Decoded {
    Text(String),
    Skip,
    Stop,
}

/// Wait for the event source to open, then stream its text deltas.
///
/// Errors before `Open` (bad status, auth, transport) are returned directly
/// so the caller can answer with an error instead of an empty stream.
pub(super) async fn open_stream(mut event_source: EventSource) -> Result<TextStream, ProviderError> {
    match event_source.next().await {
        Some(Ok(Event::Open)) => {}
        Some(Ok(Event::Message(message))) => {
            debug!(event = %message.event, "message received before open");
        }
        Some(Err(e)) => {
            event_source.close();
            return Err(into_provider_error(e).await);
        }
        None => {
            return Err(ProviderError::stream_error("event stream closed before opening"));
        }
    }

    let stream = async_stream::stream! {
        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(message)) => match decode_event(&message.data) {
                    Ok(Decoded::Text(text)) => yield Ok(text),
                    Ok(Decoded::Skip) => continue,
                    Ok(Decoded::Stop) => break,
                    Err(e) => {
                        yield Err(e);
                        break;
                    }
                },
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                Err(e) => {
                    yield Err(into_provider_error(e).await);
                    break;
                }
            }
        }

        event_source.close();
    };

    Ok(Box::pin(stream))
}

/// Decode one `data:` payload.
pub(super) fn decode_event(data: &str) -> Result<Decoded, ProviderError> {
    let event: StreamEvent = serde_json::from_str(data).map_err(|e| {
        ProviderError::stream_error(format!("failed to parse Anthropic event: {e}"))
    })?;

    Ok(match event {
        StreamEvent::ContentBlockDelta { delta: ContentDelta::TextDelta { text } } if !text.is_empty() => {
            Decoded::Text(text)
        }
        StreamEvent::MessageDelta { delta } => {
            debug!(stop_reason = ?delta.stop_reason, "message delta");
            Decoded::Skip
        }
        StreamEvent::MessageStop => Decoded::Stop,
        StreamEvent::Error { error } => {
            return Err(ProviderError::stream_error(format!(
                "{}: {}",
                error.kind, error.message
            )));
        }
        _ => Decoded::Skip,
    })
}

async fn into_provider_error(error: reqwest_eventsource::Error) -> ProviderError {
    match error {
        reqwest_eventsource::Error::InvalidStatusCode(status, response) => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error body".to_string());
            ProviderError::Api {
                provider: PROVIDER.to_owned(),
                status: status.as_u16(),
                message: api_error_message(&body),
            }
        }
        reqwest_eventsource::Error::Transport(e) => ProviderError::Http(e),
        other => ProviderError::stream_error(other.to_string()),
    }
}

/// Pull `error.message` out of an error body, falling back to the raw text.
pub(super) fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|r| format!("{}: {}", r.error.kind, r.error.message))
        .unwrap_or_else(|_| body.trim().to_owned())
}
