use std::sync::Arc;
use std::time::Duration;

use arxiv_agent_core::checkpoint::{CheckpointStore, ThreadId};
use arxiv_agent_core::{Agent, AgentBuilder, RunError};
use arxiv_agent_model::{ModelProvider, ToolCallRequest};

use crate::tools::{
    ArxivConfig, ArxivSearchTool, ReadPdfTool, RenderConfig, RenderLatexTool,
};

const SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// [`Session`] builder.
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    arxiv_config: ArxivConfig,
    render_config: RenderConfig,
}

impl SessionBuilder {
    /// Creates a new builder with the specified model provider.
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            agent_builder: AgentBuilder::with_model_provider(provider),
            arxiv_config: ArxivConfig::default(),
            render_config: RenderConfig::default(),
        }
    }

    /// Overrides the arXiv endpoint configuration.
    #[inline]
    pub fn with_arxiv_config(mut self, config: ArxivConfig) -> Self {
        self.arxiv_config = config;
        self
    }

    /// Overrides the LaTeX rendering configuration.
    #[inline]
    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render_config = config;
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
        self.agent_builder = self.agent_builder.with_checkpointer(store, thread);
        self
    }

    /// Bounds each model gateway call with a timeout.
    #[inline]
    pub fn with_model_timeout(mut self, limit: Duration) -> Self {
        self.agent_builder = self.agent_builder.with_model_timeout(limit);
        self
    }

    /// Attaches a callback invoked with every piece of assistant prose.
    #[inline]
    pub fn on_reply(
        mut self,
        on_reply: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_reply(on_reply);
        self
    }

    /// Attaches a callback invoked before each tool call is dispatched.
    #[inline]
    pub fn on_tool_call(
        mut self,
        on_tool_call: impl Fn(&ToolCallRequest) + Send + Sync + 'static,
    ) -> Self {
        self.agent_builder = self.agent_builder.on_tool_call(on_tool_call);
        self
    }

    /// Builds the session with the research tools registered.
    pub fn build(self) -> Session {
        let agent = self
            .agent_builder
            .with_system_prompt(SYSTEM_PROMPT)
            .with_tool(ArxivSearchTool::new(self.arxiv_config))
            .with_tool(ReadPdfTool::new())
            .with_tool(RenderLatexTool::new(self.render_config))
            .build();
        Session { agent }
    }
}

/// A research conversation with the full toolset attached.
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends one user message and drives the agent to its final reply.
    pub async fn send_message(
        &mut self,
        message: &str,
    ) -> Result<String, RunError> {
        self.agent.run(message).await
    }
}
