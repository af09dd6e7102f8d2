//! The provider trait.

use std::future::Future;

use crate::error::ProviderError;
use crate::stream::StreamHandle;
use crate::types::{CompletionRequest, CompletionResponse};

/// LLM provider interface.
///
/// Uses RPITIT (return-position `impl Trait` in traits) and is therefore not
/// object-safe. Callers that need to be provider-agnostic take a generic
/// `P: Provider`.
pub trait Provider: Send + Sync {
    /// Send a completion request and wait for the whole response.
    fn complete(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, ProviderError>> + Send;

    /// Send a completion request and stream the response back.
    ///
    /// Errors that happen before the first byte (HTTP status, connection)
    /// are returned here; errors after that arrive as
    /// [`StreamEvent::Error`](crate::StreamEvent::Error).
    fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> impl Future<Output = Result<StreamHandle, ProviderError>> + Send;
}
