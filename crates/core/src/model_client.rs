use std::pin::Pin;
use std::sync::Arc;

use arxiv_agent_model::{
    ModelCompletion, ModelProvider, ModelProviderError, ModelRequest,
};
use tracing::Instrument;

type CompleteResult = Result<ModelCompletion, Box<dyn ModelProviderError>>;
type BoxedCompleteFuture = Pin<Box<dyn Future<Output = CompleteResult> + Send>>;
type HandlerFn =
    Arc<dyn Fn(ModelRequest) -> BoxedCompleteFuture + Send + Sync>;

/// A wrapper around a model provider that provides a type-erased
/// interface for the agent, which doesn't want a provider generic of
/// its own.
#[derive(Clone)]
pub struct ModelClient {
    handler_fn: HandlerFn,
}

impl ModelClient {
    /// Creates a client backed by the given provider.
    #[inline]
    pub fn new<P: ModelProvider + 'static>(provider: P) -> Self {
        let handler_fn: HandlerFn = Arc::new(move |req| {
            trace!("got a request: {:?}", req);
            let fut = provider.complete(&req);
            Box::pin(
                async move {
                    let result = fut.await;
                    if let Err(err) = &result {
                        error!("got an error: {err:?}");
                    }
                    result.map_err(|err| {
                        Box::new(err) as Box<dyn ModelProviderError>
                    })
                }
                .instrument(trace_span!("model client req")),
            )
        });
        Self { handler_fn }
    }

    /// Sends a request and returns the completion.
    ///
    /// # Cancel safety
    ///
    /// This method is cancel safe. Dropping the returned future abandons
    /// the in-flight provider call.
    #[inline]
    pub async fn complete(&self, req: ModelRequest) -> CompleteResult {
        (self.handler_fn)(req).await
    }
}
