use std::sync::Arc;
use std::time::Duration;

use arxiv_agent_model::{ModelProvider, ToolCallRequest};

use super::Agent;
use crate::checkpoint::{CheckpointStore, ThreadId};
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::{AnyTool, Registry, Tool, ToolObject};

const DEFAULT_MAX_ROUNDS: usize = 16;

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    tools: Vec<Box<dyn ToolObject>>,
    system_prompt: Option<String>,
    checkpointer: Option<(Arc<dyn CheckpointStore>, ThreadId)>,
    max_rounds: usize,
    model_timeout: Option<Duration>,
    on_reply: Option<Box<dyn Fn(&str) + Send + Sync>>,
    on_tool_call: Option<Box<dyn Fn(&ToolCallRequest) + Send + Sync>>,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            tools: vec![],
            system_prompt: None,
            checkpointer: None,
            max_rounds: DEFAULT_MAX_ROUNDS,
            model_timeout: None,
            on_reply: None,
            on_tool_call: None,
        }
    }

    /// Sets the system prompt, inserted before the first user message.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.tools.push(Box::new(AnyTool(tool)));
        self
    }

    /// Persists the conversation in `store` under `thread`, restoring
    /// any state the thread already has.
    #[inline]
    pub fn with_checkpointer(
        mut self,
        store: Arc<dyn CheckpointStore>,
        thread: impl Into<ThreadId>,
    ) -> Self {
        self.checkpointer = Some((store, thread.into()));
        self
    }

    /// Caps the number of model rounds per run. Defaults to 16.
    #[inline]
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Bounds each model gateway call with a timeout. Unbounded by
    /// default.
    #[inline]
    pub fn with_model_timeout(mut self, limit: Duration) -> Self {
        self.model_timeout = Some(limit);
        self
    }

    /// Attaches a callback invoked with every piece of assistant prose.
    #[inline]
    pub fn on_reply(
        mut self,
        on_reply: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_reply = Some(Box::new(on_reply));
        self
    }

    /// Attaches a callback invoked before each tool call is dispatched.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolCallRequest) + Send + Sync + 'static,
    ) -> Self {
        self.on_tool_call = Some(Box::new(on_tool_call));
        self
    }

    /// Builds the agent.
    pub fn build(self) -> Agent {
        let conversation = match &self.checkpointer {
            Some((store, thread)) => {
                store.load(thread).unwrap_or_else(Conversation::new)
            }
            None => Conversation::new(),
        };
        Agent {
            model_client: self.model_client,
            registry: Registry::with_tools(self.tools),
            conversation,
            system_prompt: self.system_prompt,
            checkpointer: self.checkpointer,
            max_rounds: self.max_rounds,
            model_timeout: self.model_timeout,
            on_reply: self.on_reply,
            on_tool_call: self.on_tool_call,
        }
    }
}
