//! OpenAI-compatible API client struct and builder.

use std::future::Future;
use std::time::Duration;

use trickle_types::{CompletionRequest, CompletionResponse, Provider, ProviderError, StreamHandle};

use crate::error::{TimeoutLimits, map_http_status, map_reqwest_error};
use crate::mapping::{from_api_response, to_api_request};
use crate::streaming::stream_completion;

/// Default model used when none is specified on the request.
const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default API base URL: a local inference server.
const DEFAULT_BASE_URL: &str = "http://localhost:8080/v1";

/// Default limit on establishing the TCP/TLS connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for an OpenAI-compatible Chat Completions endpoint.
///
/// There is no limit on total request duration: a generation may stream for
/// as long as the server keeps sending. Only connecting is bounded by
/// default; [`OpenAi::read_timeout`] optionally bounds the silence between
/// two reads.
///
/// # Example
///
/// ```no_run
/// use trickle_provider_openai::OpenAi;
///
/// let client = OpenAi::new("EMPTY")
///     .model("gpt-3.5-turbo")
///     .base_url("http://localhost:8080/v1");
/// ```
#[derive(Debug, Clone)]
pub struct OpenAi {
    /// API key sent as a bearer token. Empty means no `Authorization` header.
    pub(crate) api_key: String,
    /// Default model identifier used when the request does not specify one.
    pub(crate) model: String,
    /// API base URL including the version prefix (e.g. `.../v1`).
    pub(crate) base_url: String,
    /// Optional organization ID for multi-org OpenAI accounts.
    pub(crate) organization: Option<String>,
    /// Limit on establishing a connection.
    pub(crate) connect_timeout: Duration,
    /// Limit on the gap between two reads. `None` waits forever.
    pub(crate) read_timeout: Option<Duration>,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl OpenAi {
    /// Create a new client with the given API key and local defaults.
    ///
    /// Default model: `gpt-3.5-turbo`.
    /// Default base URL: `http://localhost:8080/v1`.
    /// Local servers usually accept any key; `"EMPTY"` is customary.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.into(),
            base_url: DEFAULT_BASE_URL.into(),
            organization: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: None,
            client: http_client(DEFAULT_CONNECT_TIMEOUT, None).unwrap_or_default(),
        }
    }

    /// Override the default model.
    ///
    /// This is used when [`CompletionRequest::model`] is empty.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the API base URL. A trailing slash is ignored.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the OpenAI organization ID, sent as the `OpenAI-Organization` header.
    #[must_use]
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Override the connect timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.rebuild_client();
        self
    }

    /// Fail a request when the server stays silent longer than `timeout`
    /// between two reads, response headers included.
    ///
    /// A stream that keeps delivering tokens is never cut off, however long
    /// the generation runs.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.rebuild_client();
        self
    }

    fn rebuild_client(&mut self) {
        match http_client(self.connect_timeout, self.read_timeout) {
            Ok(client) => self.client = client,
            Err(e) => tracing::warn!(error = %e, "keeping previous HTTP client, timeouts not applied"),
        }
    }

    /// Build the chat completions endpoint URL.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn post(&self, body: &serde_json::Value) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .post(self.completions_url())
            .header("content-type", "application/json")
            .json(body);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }
        if let Some(org) = &self.organization {
            builder = builder.header("OpenAI-Organization", org);
        }
        builder
    }

    fn limits(&self) -> TimeoutLimits {
        TimeoutLimits {
            connect: self.connect_timeout,
            read: self.read_timeout,
        }
    }
}

fn http_client(
    connect_timeout: Duration,
    read_timeout: Option<Duration>,
) -> reqwest::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().connect_timeout(connect_timeout);
    if let Some(read) = read_timeout {
        builder = builder.read_timeout(read);
    }
    builder.build()
}

impl Provider for OpenAi {
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send {
        let body = to_api_request(&request, &self.model, false);
        let builder = self.post(&body);
        let limits = self.limits();
        let url = self.completions_url();

        async move {
            tracing::debug!(url = %url, model = %body["model"], messages = request.messages.len(), "sending completion request");

            let response = builder
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, limits))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| map_reqwest_error(e, limits))?;

            if !status.is_success() {
                tracing::warn!(%status, "completion request rejected");
                return Err(map_http_status(status, &text));
            }

            let json: serde_json::Value = serde_json::from_str(&text)
                .map_err(|e| ProviderError::InvalidResponse(format!("invalid JSON response: {e}")))?;

            from_api_response(&json)
        }
    }

    fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send {
        let body = to_api_request(&request, &self.model, true);
        let builder = self.post(&body);
        let limits = self.limits();
        let url = self.completions_url();

        async move {
            tracing::debug!(url = %url, model = %body["model"], messages = request.messages.len(), "sending streaming completion request");

            let response = builder
                .send()
                .await
                .map_err(|e| map_reqwest_error(e, limits))?;

            let status = response.status();
            if !status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| map_reqwest_error(e, limits))?;
                tracing::warn!(%status, "streaming request rejected");
                return Err(map_http_status(status, &text));
            }

            Ok(stream_completion(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_local() {
        let client = OpenAi::new("EMPTY");
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.connect_timeout, DEFAULT_CONNECT_TIMEOUT);
        assert_eq!(client.read_timeout, None);
        assert!(client.organization.is_none());
        assert_eq!(client.api_key, "EMPTY");
    }

    #[test]
    fn builder_overrides() {
        let client = OpenAi::new("sk-test")
            .model("llama-3-8b")
            .base_url("http://192.168.50.80:8080/v1/")
            .organization("org-abc")
            .connect_timeout(Duration::from_secs(5))
            .read_timeout(Duration::from_secs(60));
        assert_eq!(client.model, "llama-3-8b");
        assert_eq!(client.base_url, "http://192.168.50.80:8080/v1");
        assert_eq!(client.organization.as_deref(), Some("org-abc"));
        assert_eq!(client.connect_timeout, Duration::from_secs(5));
        assert_eq!(client.read_timeout, Some(Duration::from_secs(60)));
    }

    #[test]
    fn completions_url_appends_path() {
        let client = OpenAi::new("k").base_url("http://localhost:9999/v1");
        assert_eq!(
            client.completions_url(),
            "http://localhost:9999/v1/chat/completions"
        );
    }
}
