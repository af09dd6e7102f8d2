//! Integration tests for the OpenAI-compatible provider using wiremock.

use futures::StreamExt;
use trickle_provider_openai::OpenAi;
use trickle_sink::{ManualClock, MemorySink, SinkConfig, ThrottledTokenSink};
use trickle_types::{
    CompletionRequest, Message, Provider, ProviderError, StreamEvent, drive_stream,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn minimal_request() -> CompletionRequest {
    CompletionRequest {
        messages: vec![
            Message::system("You are WANCO, a care worker."),
            Message::user("My back hurts."),
        ],
        temperature: Some(0.0),
        ..Default::default()
    }
}

fn success_body() -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Try gentle stretching." },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 30, "completion_tokens": 5, "total_tokens": 35 }
    })
}

fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = serde_json::json!({
            "id": "chatcmpl-s",
            "model": "gpt-3.5-turbo",
            "choices": [{ "index": 0, "delta": { "content": fragment }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {chunk}\n\n"));
    }
    let last = serde_json::json!({
        "id": "chatcmpl-s",
        "choices": [{ "index": 0, "delta": {}, "finish_reason": "stop" }]
    });
    body.push_str(&format!("data: {last}\n\n"));
    let usage = serde_json::json!({
        "id": "chatcmpl-s",
        "choices": [],
        "usage": { "prompt_tokens": 20, "completion_tokens": 4, "total_tokens": 24 }
    });
    body.push_str(&format!("data: {usage}\n\ndata: [DONE]\n\n"));
    body
}

#[tokio::test]
async fn complete_posts_to_chat_completions() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer EMPTY"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-3.5-turbo",
            "stream": false,
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let resp = provider.complete(minimal_request()).await.expect("should succeed");

    assert_eq!(resp.text(), "Try gentle stretching.");
    assert_eq!(resp.usage.input_tokens, 30);
}

#[tokio::test]
async fn complete_maps_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'nope' not found"))
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let err = provider.complete(minimal_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::ModelNotFound(ref m) if m.contains("nope")));
}

#[tokio::test]
async fn complete_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let err = provider.complete(minimal_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn stream_yields_text_usage_and_completion() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "stream": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body(&["Hel", "lo, ", "wor", "ld!"])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let handle = provider
        .complete_stream(minimal_request())
        .await
        .expect("should succeed");

    let events: Vec<StreamEvent> = handle.receiver.collect().await;

    let text: String = events
        .iter()
        .filter_map(|e| match e {
            StreamEvent::TextDelta(t) => Some(t.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Hello, world!");

    assert!(events.iter().any(|e| matches!(e, StreamEvent::Usage(u) if u.output_tokens == 4)));
    match events.last() {
        Some(StreamEvent::MessageComplete(resp)) => {
            assert_eq!(resp.text(), "Hello, world!");
            assert_eq!(resp.id, "chatcmpl-s");
            assert_eq!(resp.usage.input_tokens, 20);
        }
        other => panic!("expected MessageComplete last, got {other:?}"),
    }
}

#[tokio::test]
async fn stream_returns_error_on_non_success_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let err = provider.complete_stream(minimal_request()).await.unwrap_err();

    assert!(matches!(err, ProviderError::ServiceUnavailable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn empty_api_key_sends_no_authorization() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer "))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .mount(&server)
        .await;

    let provider = OpenAi::new("").base_url(format!("{}/v1", server.uri()));
    let resp = provider.complete(minimal_request()).await;

    assert!(resp.is_ok(), "expected Ok, got {:?}", resp.err());
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn stream_through_throttled_sink() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(sse_body(&["a", "b", "c"])),
        )
        .mount(&server)
        .await;

    let provider = OpenAi::new("EMPTY").base_url(format!("{}/v1", server.uri()));
    let out = MemorySink::new();
    let mut sink =
        ThrottledTokenSink::with_clock(SinkConfig::default(), out.clone(), ManualClock::new());

    let handle = provider.complete_stream(minimal_request()).await.unwrap();
    let resp = drive_stream(handle, &mut sink).await.unwrap();

    assert_eq!(resp.text(), "abc");
    // Clock never moved: everything arrives in the completion flush.
    assert_eq!(out.texts(), vec!["abc"]);
}
