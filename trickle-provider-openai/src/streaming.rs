//! SSE streaming support for the Chat Completions API.
//!
//! Parses the Server-Sent Events stream and maps it to [`StreamEvent`]s.
//!
//! ```text
//! data: {"id":"...","choices":[{"delta":{"content":"text"}}]}
//!
//! data: {"id":"...","choices":[],"usage":{"prompt_tokens":9,"completion_tokens":3}}
//!
//! data: [DONE]
//! ```
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat/streaming>

use futures::{Stream, StreamExt};
use reqwest::Response;
use trickle_types::{
    CompletionResponse, Message, StopReason, StreamError, StreamEvent, StreamHandle, TokenUsage,
};

use crate::mapping::{parse_finish_reason, parse_usage};

/// Wrap an HTTP response body into a [`StreamHandle`].
pub(crate) fn stream_completion(response: Response) -> StreamHandle {
    StreamHandle::new(parse_sse_stream(response.bytes_stream()))
}

/// Parse a raw byte stream into [`StreamEvent`]s.
///
/// Partial lines are carried across chunks. The stream ends with
/// `MessageComplete` unless an error event was yielded first.
pub(crate) fn parse_sse_stream(
    byte_stream: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> impl Stream<Item = StreamEvent> + Send + 'static {
    async_stream::stream! {
        let mut state = SseParserState::new();
        let mut bytes_stream = std::pin::pin!(byte_stream);
        // Raw bytes, so a multi-byte character split across chunks survives.
        let mut line_buf: Vec<u8> = Vec::new();

        while let Some(chunk_result) = bytes_stream.next().await {
            let chunk = match chunk_result {
                Ok(b) => b,
                Err(e) if e.is_timeout() => {
                    yield StreamEvent::Error(StreamError::retryable(format!("stream idle past read timeout: {e}")));
                    return;
                }
                Err(e) => {
                    yield StreamEvent::Error(StreamError::retryable(format!("stream read error: {e}")));
                    return;
                }
            };
            line_buf.extend_from_slice(&chunk);

            while let Some(newline_pos) = line_buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = line_buf.drain(..=newline_pos).collect();
                let line = match std::str::from_utf8(&raw) {
                    Ok(s) => s.trim_end_matches(['\n', '\r']).to_string(),
                    Err(e) => {
                        yield StreamEvent::Error(StreamError::non_retryable(format!("UTF-8 decode error: {e}")));
                        return;
                    }
                };

                for event in state.process_line(&line) {
                    let failed = matches!(event, StreamEvent::Error(_));
                    yield event;
                    if failed {
                        return;
                    }
                }
            }
        }

        // Flush a trailing line without newline, then dispatch what is pending
        let tail = String::from_utf8_lossy(&line_buf).trim().to_string();
        let mut pending = if tail.is_empty() { Vec::new() } else { state.process_line(&tail) };
        pending.extend(state.process_line(""));
        for event in pending {
            let failed = matches!(event, StreamEvent::Error(_));
            yield event;
            if failed {
                return;
            }
        }

        yield StreamEvent::MessageComplete(state.take_final_response());
    }
}

/// Tracks in-progress streaming state across SSE data lines.
#[derive(Debug, Default)]
pub(crate) struct SseParserState {
    /// Pending `data:` payload (may span several lines).
    current_data: String,
    /// Text assembled so far.
    text_buf: String,
    id: String,
    model: String,
    stop_reason: Option<StopReason>,
    usage: Option<TokenUsage>,
}

impl SseParserState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Process one SSE line and return any events it produces.
    pub(crate) fn process_line(&mut self, line: &str) -> Vec<StreamEvent> {
        if line.is_empty() {
            // Blank line: dispatch the accumulated data
            return self.dispatch_data();
        }

        if let Some(data) = line.strip_prefix("data:") {
            let data = data.strip_prefix(' ').unwrap_or(data);
            if !self.current_data.is_empty() {
                self.current_data.push('\n');
            }
            self.current_data.push_str(data);
        }
        // event:, id:, retry: and ':' comment lines carry nothing we use.

        vec![]
    }

    /// Dispatch the accumulated data.
    fn dispatch_data(&mut self) -> Vec<StreamEvent> {
        let data = std::mem::take(&mut self.current_data);

        if data.is_empty() || data == "[DONE]" {
            return vec![];
        }

        let json: serde_json::Value = match serde_json::from_str(&data) {
            Ok(v) => v,
            Err(e) => {
                return vec![StreamEvent::Error(StreamError::non_retryable(format!(
                    "JSON parse error in SSE: {e}"
                )))];
            }
        };

        if let Some(error) = json.get("error") {
            let msg = error["message"]
                .as_str()
                .or_else(|| error.as_str())
                .unwrap_or("unknown streaming error")
                .to_string();
            return vec![StreamEvent::Error(StreamError::non_retryable(msg))];
        }

        if self.id.is_empty()
            && let Some(id) = json["id"].as_str()
        {
            self.id = id.to_string();
        }
        if self.model.is_empty()
            && let Some(model) = json["model"].as_str()
        {
            self.model = model.to_string();
        }

        let mut events = Vec::new();

        if let Some(choice) = json["choices"].as_array().and_then(|c| c.first()) {
            if let Some(content) = choice["delta"]["content"].as_str()
                && !content.is_empty()
            {
                self.text_buf.push_str(content);
                events.push(StreamEvent::TextDelta(content.to_string()));
            }

            if let Some(reason) = choice["finish_reason"].as_str() {
                self.stop_reason = Some(parse_finish_reason(reason));
            }
        }

        // Usage arrives in a final chunk with empty choices
        if let Some(usage_val) = json.get("usage")
            && usage_val.is_object()
        {
            let usage = parse_usage(usage_val);
            self.usage = Some(usage);
            events.push(StreamEvent::Usage(usage));
        }

        events
    }

    /// Assemble the final response from buffered state.
    pub(crate) fn take_final_response(&mut self) -> CompletionResponse {
        CompletionResponse {
            id: std::mem::take(&mut self.id),
            model: std::mem::take(&mut self.model),
            message: Message::assistant(std::mem::take(&mut self.text_buf)),
            usage: self.usage.take().unwrap_or_default(),
            stop_reason: self.stop_reason.take().unwrap_or(StopReason::EndTurn),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
