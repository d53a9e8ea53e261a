use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::NativeMessage;

/// The reason why the model stopped generating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelFinishReason {
    /// The model needs to call one or more tools.
    ToolCalls,
    /// The model has finished generating text.
    Stop,
}

/// A tool call requested by the model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// The unique identifier for this request, echoed back in the
    /// matching [`ToolCallResult`](crate::ToolCallResult).
    pub id: String,
    /// The name of the tool to call.
    pub name: String,
    /// The arguments to pass to the tool.
    pub arguments: Value,
}

/// A fully received reply from the model gateway.
///
/// A completion is either a plain textual reply (`tool_calls` is empty)
/// or a batch of tool call requests; the agent branches on that.
#[derive(Clone, Debug)]
pub struct ModelCompletion {
    /// The textual part of the reply. May be empty when the reply only
    /// carries tool call requests.
    pub text: String,
    /// Tool calls requested by the model.
    pub tool_calls: Vec<ToolCallRequest>,
    /// Why the model stopped.
    pub finish_reason: ModelFinishReason,
    /// The provider-native form of this reply, to be inserted into the
    /// conversation history in place of a plain assistant message.
    pub native_msg: Option<NativeMessage>,
}

impl ModelCompletion {
    /// Returns `true` if this completion is a plain textual reply.
    #[inline]
    pub fn is_reply(&self) -> bool {
        self.tool_calls.is_empty()
    }
}
