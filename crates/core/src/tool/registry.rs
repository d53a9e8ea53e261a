use std::collections::HashMap;
use std::pin::Pin;

use arxiv_agent_model::{ModelTool, ToolCallRequest};

use crate::tool::{Error, ToolObject, ToolResult};

/// The fixed set of named tools available to the model.
///
/// The registry is populated once at construction and never mutated
/// afterwards; it is read-only shared state and safe to use from
/// independent conversations.
pub struct Registry {
    tools: HashMap<String, Box<dyn ToolObject>>,
}

impl Registry {
    pub(crate) fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name();
            tool_map.insert(name.to_owned(), tool);
        }
        Self { tools: tool_map }
    }

    /// Returns the schema definitions of every registered tool.
    #[inline]
    pub fn definitions(&self) -> Vec<ModelTool> {
        self.tools
            .values()
            .map(|tool| ModelTool {
                name: tool.name().to_owned(),
                description: tool.description().to_owned(),
                parameters: tool.parameter_schema().clone(),
            })
            .collect()
    }

    /// Resolves a tool call request into its execution future.
    ///
    /// Fails with [`ErrorKind::UnknownTool`](crate::tool::ErrorKind) when
    /// no tool is registered under the requested name, and with
    /// [`ErrorKind::InvalidArguments`](crate::tool::ErrorKind) when the
    /// arguments don't deserialize against the tool's input type.
    pub fn dispatch(
        &self,
        req: &ToolCallRequest,
    ) -> Result<Pin<Box<dyn Future<Output = ToolResult> + Send>>, Error> {
        let span = debug_span!("tool registry");
        let _enter = span.enter();

        let Some(tool) = self.tools.get(&req.name) else {
            warn!("tool not found: {}", req.name);
            return Err(Error::unknown_tool().with_reason(req.name.clone()));
        };
        trace!(
            "dispatching a tool ({}) with args: {:?}",
            req.id, req.arguments
        );
        tool.dispatch(req.arguments.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::future::ready;

    use serde::Deserialize;
    use serde_json::{Value, json};

    use super::*;
    use crate::tool::{AnyTool, ErrorKind, Tool};

    static EMPTY_SCHEMA: &Value = &Value::Null;

    #[derive(Deserialize)]
    struct ProbeInput {
        tag: String,
    }

    struct ProbeTool;

    impl Tool for ProbeTool {
        type Input = ProbeInput;

        fn name(&self) -> &str {
            "probe"
        }

        fn description(&self) -> &str {
            "A probe tool"
        }

        fn parameter_schema(&self) -> &Value {
            EMPTY_SCHEMA
        }

        fn execute(
            &self,
            input: ProbeInput,
        ) -> impl Future<Output = ToolResult> + Send + 'static {
            ready(Ok(format!("probed {}", input.tag)))
        }
    }

    #[tokio::test]
    async fn test_dispatch() {
        let registry = Registry::with_tools(vec![Box::new(AnyTool(ProbeTool))]);

        let fut = registry
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "probe".to_owned(),
                arguments: json!({ "tag": "alpha" }),
            })
            .unwrap();
        assert_eq!(fut.await.unwrap(), "probed alpha");
    }

    #[test]
    fn test_unknown_tool() {
        let registry = Registry::with_tools(vec![Box::new(AnyTool(ProbeTool))]);

        let err = registry
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "search_the_web".to_owned(),
                arguments: json!({}),
            })
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownTool);
    }

    #[test]
    fn test_invalid_arguments() {
        let registry = Registry::with_tools(vec![Box::new(AnyTool(ProbeTool))]);

        let err = registry
            .dispatch(&ToolCallRequest {
                id: "tool:1".to_owned(),
                name: "probe".to_owned(),
                arguments: json!({ "tag": 42 }),
            })
            .map(|_| ())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_definitions() {
        let registry = Registry::with_tools(vec![Box::new(AnyTool(ProbeTool))]);
        let definitions = registry.definitions();
        assert_eq!(definitions.len(), 1);
        assert_eq!(definitions[0].name, "probe");
    }
}
