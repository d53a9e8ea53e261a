//! Tool call supports.

mod error;
mod registry;

use std::pin::Pin;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::{Error, ErrorKind};
pub use registry::Registry;

/// The result of a tool call.
pub type ToolResult = Result<String, Error>;

/// A tool that can be called by the model.
///
/// Implementations of this trait should be stateless, and may not maintain
/// any internal state between calls.
///
/// The tool can be context-aware, meaning it can access additional
/// information such as an endpoint URL or an output directory. To do this,
/// make the context an immutable part of the tool, set during
/// initialization, and copy it when executing.
pub trait Tool: Send + Sync + 'static {
    /// The type of input that the tool accepts.
    type Input: DeserializeOwned;

    /// Returns the name of the tool.
    fn name(&self) -> &str;

    /// Returns the description of the tool.
    fn description(&self) -> &str;

    /// Returns the parameter schema of the tool.
    fn parameter_schema(&self) -> &Value;

    /// Executes the tool with the given input.
    ///
    /// This method must return a future that is fully independent of
    /// `self`, and the future should be cancellation safe.
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static;
}

pub(crate) trait ToolObject: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn parameter_schema(&self) -> &Value;

    /// Validates the arguments and returns the execution future.
    ///
    /// Argument validation happens here, before the future is created,
    /// so that malformed requests can abort the round instead of being
    /// reported back to the model as tool output.
    fn dispatch(
        &self,
        arguments: Value,
    ) -> Result<Pin<Box<dyn Future<Output = ToolResult> + Send>>, Error>;
}

pub(crate) struct AnyTool<T: Tool>(pub T);

impl<T: Tool> ToolObject for AnyTool<T> {
    #[inline]
    fn name(&self) -> &str {
        self.0.name()
    }

    #[inline]
    fn description(&self) -> &str {
        self.0.description()
    }

    #[inline]
    fn parameter_schema(&self) -> &Value {
        self.0.parameter_schema()
    }

    #[inline]
    fn dispatch(
        &self,
        arguments: Value,
    ) -> Result<Pin<Box<dyn Future<Output = ToolResult> + Send>>, Error> {
        let input: T::Input = serde_json::from_value(arguments)
            .map_err(|err| {
                Error::invalid_arguments().with_reason(format!("{err}"))
            })?;
        Ok(Box::pin(self.0.execute(input)))
    }
}
