//! Request/response mapping between trickle-types and the Chat Completions JSON format.
//!
//! Reference: <https://platform.openai.com/docs/api-reference/chat>

use trickle_types::{
    CompletionRequest, CompletionResponse, Message, ProviderError, Role, StopReason, TokenUsage,
};

// ─── Request mapping ─────────────────────────────────────────────────────────

/// Convert a [`CompletionRequest`] into a Chat Completions request body.
///
/// Streaming bodies also ask for a trailing usage chunk.
#[must_use]
pub fn to_api_request(
    req: &CompletionRequest,
    default_model: &str,
    stream: bool,
) -> serde_json::Value {
    let model = if req.model.is_empty() {
        default_model
    } else {
        req.model.as_str()
    };

    let messages: Vec<serde_json::Value> = req
        .messages
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect();

    let mut body = serde_json::json!({
        "model": model,
        "messages": messages,
        "stream": stream,
    });

    if stream {
        body["stream_options"] = serde_json::json!({ "include_usage": true });
    }

    if let Some(max_tokens) = req.max_tokens {
        body["max_tokens"] = serde_json::Value::from(max_tokens);
    }

    if let Some(temp) = req.temperature {
        body["temperature"] = serde_json::Value::from(temp);
    }

    if !req.stop.is_empty() {
        body["stop"] = serde_json::Value::from(req.stop.clone());
    }

    body
}

// ─── Response mapping ────────────────────────────────────────────────────────

/// Parse a non-streaming Chat Completions response body.
///
/// Local servers do not always send an `id`; it defaults to empty.
pub fn from_api_response(body: &serde_json::Value) -> Result<CompletionResponse, ProviderError> {
    let choice = body["choices"]
        .as_array()
        .and_then(|arr| arr.first())
        .ok_or_else(|| ProviderError::InvalidResponse("missing 'choices' array in response".into()))?;

    let text = choice["message"]["content"].as_str().unwrap_or_default();

    Ok(CompletionResponse {
        id: body["id"].as_str().unwrap_or_default().to_string(),
        model: body["model"].as_str().unwrap_or_default().to_string(),
        message: Message {
            role: Role::Assistant,
            content: text.to_string(),
        },
        usage: parse_usage(&body["usage"]),
        stop_reason: choice["finish_reason"]
            .as_str()
            .map(parse_finish_reason)
            .unwrap_or(StopReason::EndTurn),
    })
}

/// Parse a `usage` object. Missing fields count as zero.
pub(crate) fn parse_usage(usage: &serde_json::Value) -> TokenUsage {
    TokenUsage {
        input_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as usize,
        output_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as usize,
    }
}

/// Map a `finish_reason` string to a [`StopReason`].
pub(crate) fn parse_finish_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        "stop_sequence" => StopReason::StopSequence,
        _ => StopReason::EndTurn,
    }
}
