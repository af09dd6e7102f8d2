//! Streaming types and the callback driver.
//!
//! A streaming provider yields [`StreamEvent`]s through a [`StreamHandle`].
//! [`drive_stream`] consumes the handle in order and pushes each event into a
//! [`StreamCallbacks`] implementation, one call at a time on the calling task.
//! [`stream_into`] does the same starting from a request.

use std::pin::Pin;

use futures::{Stream, StreamExt};

use crate::error::ProviderError;
use crate::traits::Provider;
use crate::types::{CompletionRequest, CompletionResponse, Message, StopReason, TokenUsage};

/// An event emitted while a completion streams in.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An incremental text fragment.
    TextDelta(String),
    /// Usage statistics (usually in the final chunk).
    Usage(TokenUsage),
    /// The stream finished and the full response has been assembled.
    MessageComplete(CompletionResponse),
    /// The producer reported an error; no further events follow.
    Error(StreamError),
}

/// An error reported mid-stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamError {
    /// Human-readable description.
    pub message: String,
    /// Whether a fresh request could plausibly succeed.
    pub is_retryable: bool,
}

impl StreamError {
    /// A transient stream error (connection dropped, read failure).
    #[must_use]
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_retryable: true,
        }
    }

    /// A permanent stream error (malformed payload, server-side error object).
    #[must_use]
    pub fn non_retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_retryable: false,
        }
    }
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Handle to a running completion stream.
pub struct StreamHandle {
    /// The ordered event stream.
    pub receiver: Pin<Box<dyn Stream<Item = StreamEvent> + Send>>,
}

impl StreamHandle {
    /// Wrap any event stream.
    pub fn new(stream: impl Stream<Item = StreamEvent> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(stream),
        }
    }

    /// A handle over a fixed list of events. Handy for tests and replays.
    #[must_use]
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        Self::new(futures::stream::iter(events))
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle").finish_non_exhaustive()
    }
}

/// Receiver of a streamed generation.
///
/// Callbacks are invoked sequentially and never concurrently. Exactly one of
/// `on_complete` or `on_error` ends a request driven by [`drive_stream`].
pub trait StreamCallbacks {
    /// A new text fragment arrived.
    fn on_token(&mut self, token: &str);

    /// The generation finished.
    fn on_complete(&mut self, response: &CompletionResponse);

    /// The producer failed or was interrupted.
    fn on_error(&mut self, error: &ProviderError);
}

impl<T: StreamCallbacks + ?Sized> StreamCallbacks for &mut T {
    fn on_token(&mut self, token: &str) {
        (**self).on_token(token);
    }

    fn on_complete(&mut self, response: &CompletionResponse) {
        (**self).on_complete(response);
    }

    fn on_error(&mut self, error: &ProviderError) {
        (**self).on_error(error);
    }
}

/// Consume `handle`, pushing every event into `callbacks`.
///
/// - `TextDelta` calls `on_token`.
/// - `MessageComplete` calls `on_complete` and returns the response.
/// - `Error` calls `on_error` and returns [`ProviderError::StreamError`].
///
/// A stream that ends without `MessageComplete` is treated as complete: the
/// response is assembled from the fragments seen so far.
pub async fn drive_stream<C>(
    handle: StreamHandle,
    callbacks: &mut C,
) -> Result<CompletionResponse, ProviderError>
where
    C: StreamCallbacks + ?Sized,
{
    let mut receiver = handle.receiver;
    let mut text = String::new();
    let mut usage: Option<TokenUsage> = None;

    while let Some(event) = receiver.next().await {
        match event {
            StreamEvent::TextDelta(token) => {
                tracing::trace!(len = token.len(), "token");
                text.push_str(&token);
                callbacks.on_token(&token);
            }
            StreamEvent::Usage(u) => usage = Some(u),
            StreamEvent::MessageComplete(mut response) => {
                if let Some(u) = usage
                    && response.usage == TokenUsage::default()
                {
                    response.usage = u;
                }
                callbacks.on_complete(&response);
                return Ok(response);
            }
            StreamEvent::Error(e) => {
                tracing::debug!(error = %e, retryable = e.is_retryable, "stream failed");
                let err = ProviderError::StreamError(e.message);
                callbacks.on_error(&err);
                return Err(err);
            }
        }
    }

    tracing::debug!("stream ended without a completion event");
    let response = CompletionResponse {
        id: String::new(),
        model: String::new(),
        message: Message::assistant(text),
        usage: usage.unwrap_or_default(),
        stop_reason: StopReason::EndTurn,
    };
    callbacks.on_complete(&response);
    Ok(response)
}

/// Send `request` to `provider` and drive the reply into `callbacks`.
///
/// Every request ends in exactly one terminal callback: a request the
/// provider refuses before any event arrives also reaches `on_error`.
pub async fn stream_into<P, C>(
    provider: &P,
    request: CompletionRequest,
    callbacks: &mut C,
) -> Result<CompletionResponse, ProviderError>
where
    P: Provider,
    C: StreamCallbacks + ?Sized,
{
    let handle = match provider.complete_stream(request).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::debug!(error = %e, "request refused before streaming");
            callbacks.on_error(&e);
            return Err(e);
        }
    };
    drive_stream(handle, callbacks).await
}
