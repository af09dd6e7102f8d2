//! ConversationChain against a canned provider, no network.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use trickle_memory::{
    ChatPromptTemplate, ConversationBufferMemory, ConversationChain, ConversationMemory,
};
use trickle_sink::{ManualClock, MemorySink, SinkConfig, ThrottledTokenSink};
use trickle_types::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Mock provider with scripted replies. Records every request.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

enum Reply {
    /// Stream these fragments, then complete.
    Tokens(Vec<&'static str>),
    /// Stream these fragments, then fail mid-stream.
    FailAfter(Vec<&'static str>),
    /// Refuse the request outright.
    Reject,
}

#[derive(Clone)]
struct MockProvider {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Provider for MockProvider {
    fn complete(
        &self,
        _request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        async { Err(ProviderError::InvalidRequest("streaming only".into())) }
    }

    fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        async move {
            let mut events = Vec::new();
            match reply {
                Some(Reply::Tokens(tokens)) => {
                    let text = tokens.concat();
                    events.extend(tokens.into_iter().map(|t| StreamEvent::TextDelta(t.into())));
                    events.push(StreamEvent::MessageComplete(CompletionResponse {
                        id: "mock".into(),
                        model: "mock-model".into(),
                        message: Message::assistant(text),
                        usage: TokenUsage::default(),
                        stop_reason: StopReason::EndTurn,
                    }));
                }
                Some(Reply::FailAfter(tokens)) => {
                    events.extend(tokens.into_iter().map(|t| StreamEvent::TextDelta(t.into())));
                    events.push(StreamEvent::Error(StreamError::retryable("connection reset")));
                }
                Some(Reply::Reject) | None => {
                    return Err(ProviderError::ServiceUnavailable("model loading".into()));
                }
            }
            Ok(StreamHandle::from_events(events))
        }
    }
}

fn template() -> ChatPromptTemplate {
    ChatPromptTemplate::with_system("You are a friendly, talkative AI.")
}

fn sink() -> (ThrottledTokenSink<MemorySink, ManualClock>, MemorySink) {
    let out = MemorySink::new();
    let sink = ThrottledTokenSink::with_clock(SinkConfig::default(), out.clone(), ManualClock::new());
    (sink, out)
}

#[tokio::test]
async fn second_turn_sees_first_turn_in_history() {
    let provider = MockProvider::new(vec![
        Reply::Tokens(vec!["Hello ", "Taro."]),
        Reply::Tokens(vec!["Yes, ", "you are Taro."]),
    ]);
    let mut chain = ConversationChain::new(provider.clone(), template(), ConversationBufferMemory::new())
        .temperature(0.0);

    let (mut first, first_out) = sink();
    let reply = chain.predict("I'm Taro, my back hurts.", &mut first).await.unwrap();
    assert_eq!(reply, "Hello Taro.");
    assert_eq!(first_out.texts(), vec!["Hello Taro."]);

    let (mut second, second_out) = sink();
    let reply = chain.predict("Do you remember my name?", &mut second).await.unwrap();
    assert_eq!(reply, "Yes, you are Taro.");
    assert_eq!(second_out.texts(), vec!["Yes, you are Taro."]);

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].temperature, Some(0.0));
    assert_eq!(
        requests[1].messages,
        vec![
            Message::system("You are a friendly, talkative AI."),
            Message::user("I'm Taro, my back hurts."),
            Message::assistant("Hello Taro."),
            Message::user("Do you remember my name?"),
        ]
    );
    assert_eq!(chain.memory().len(), 4);
}

#[tokio::test]
async fn mid_stream_failure_leaves_memory_untouched() {
    let provider = MockProvider::new(vec![Reply::FailAfter(vec!["partial"])]);
    let mut chain = ConversationChain::new(provider, template(), ConversationBufferMemory::new());
    let (mut sink, out) = sink();

    let err = chain.predict("hello", &mut sink).await.unwrap_err();

    assert!(matches!(err, ProviderError::StreamError(_)));
    assert!(chain.memory().is_empty());
    // Default sink config drops the buffered remainder on error.
    assert!(out.is_empty());
}

#[tokio::test]
async fn rejected_request_reaches_on_error() {
    struct Seen(Vec<String>);

    impl StreamCallbacks for Seen {
        fn on_token(&mut self, _: &str) {}
        fn on_complete(&mut self, _: &CompletionResponse) {}
        fn on_error(&mut self, error: &ProviderError) {
            self.0.push(error.to_string());
        }
    }

    let provider = MockProvider::new(vec![Reply::Reject]);
    let mut chain = ConversationChain::new(provider, template(), ConversationBufferMemory::new());
    let mut seen = Seen(Vec::new());

    let err = chain.predict("hello", &mut seen).await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(seen.0, vec!["service unavailable: model loading"]);
}

#[tokio::test]
async fn model_override_is_sent() {
    let provider = MockProvider::new(vec![Reply::Tokens(vec!["ok"])]);
    let mut chain = ConversationChain::new(provider.clone(), template(), ConversationBufferMemory::new())
        .model("local-llama")
        .max_tokens(64);
    let (mut sink, _out) = sink();

    chain.predict("hi", &mut sink).await.unwrap();

    let request = &provider.requests()[0];
    assert_eq!(request.model, "local-llama");
    assert_eq!(request.max_tokens, Some(64));
}

#[tokio::test]
async fn clearing_memory_restarts_the_conversation() {
    let provider = MockProvider::new(vec![Reply::Tokens(vec!["one"]), Reply::Tokens(vec!["two"])]);
    let mut chain = ConversationChain::new(provider.clone(), template(), ConversationBufferMemory::new());
    let (mut a, _) = sink();
    chain.predict("first", &mut a).await.unwrap();

    chain.memory_mut().clear();
    let (mut b, _) = sink();
    chain.predict("second", &mut b).await.unwrap();

    assert_eq!(provider.requests()[1].messages.len(), 2);
}
