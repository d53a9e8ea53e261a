use arxiv_agent_model::{ErrorKind, ToolCallRequest};

/// The preset completion for one assistant step.
#[derive(Clone, Debug)]
pub struct PresetReply {
    /// The textual part of the reply.
    pub text: String,
    /// Tool calls carried by the reply.
    pub tool_calls: Vec<ToolCallRequest>,
    /// If set, the request fails with this kind instead of replying.
    pub error: Option<ErrorKind>,
}

impl PresetReply {
    /// Creates a plain textual reply.
    #[inline]
    pub fn with_text<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            tool_calls: vec![],
            error: None,
        }
    }

    /// Creates a reply that requests the given tool calls.
    #[inline]
    pub fn with_tool_calls(
        tool_calls: impl Into<Vec<ToolCallRequest>>,
    ) -> Self {
        Self {
            text: String::new(),
            tool_calls: tool_calls.into(),
            error: None,
        }
    }

    /// Creates a step that fails with the given error kind.
    #[inline]
    pub fn failure(kind: ErrorKind) -> Self {
        Self {
            text: String::new(),
            tool_calls: vec![],
            error: Some(kind),
        }
    }

    /// Prepends text to a tool-call reply.
    #[inline]
    pub fn and_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }
}
