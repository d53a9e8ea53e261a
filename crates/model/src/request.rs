use serde_json::Value;

use crate::NativeMessage;

/// A request to be sent to the model gateway.
///
/// The gateway is stateless: every request carries the full conversation
/// and the complete tool list, no server-side memory is assumed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelRequest {
    /// The conversation so far, in insertion order.
    pub messages: Vec<ModelMessage>,
    /// Tools that are available to the model.
    pub tools: Vec<ModelTool>,
}

/// One turn in the conversation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModelMessage {
    /// The system instructions.
    System(String),
    /// A user input text.
    User(String),
    /// An assistant text.
    Assistant(String),
    /// A tool call result.
    Tool(ToolCallResult),
    /// A provider-native history item (usually an assistant turn that
    /// carries tool call requests the neutral variants cannot express).
    Native(NativeMessage),
}

/// The result of calling a tool.
///
/// The `id` correlates this result with the tool call request it answers;
/// every request must be answered by exactly one result before the next
/// gateway call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ToolCallResult {
    /// The identifier of the tool call request this result answers.
    pub id: String,
    /// The tool's return value, or an error description.
    pub content: String,
}

/// Describes a tool that can be used by the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelTool {
    /// Name of the tool.
    pub name: String,
    /// Description of the tool.
    pub description: String,
    /// Parameters definition of the tool, as a
    /// [JSON schema](https://json-schema.org/).
    pub parameters: Value,
}
