use std::error::Error;

use crate::completion::ModelCompletion;
use crate::error::ErrorKind;
use crate::request::ModelRequest;

/// The error type for a model provider.
pub trait ModelProviderError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// A type that represents a model provider: the boundary to an external
/// inference service.
///
/// One call to [`complete`](ModelProvider::complete) is one inference
/// round trip. Providers must treat each call as an isolated
/// request/response pair: the full conversation is serialized every time,
/// and the provider may be dropped between calls.
pub trait ModelProvider: Send + Sync {
    /// The error type that may be returned by the provider.
    type Error: ModelProviderError;

    /// Sends the conversation to the model and returns its completion.
    ///
    /// The returned future must not borrow from `self`.
    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static;
}
