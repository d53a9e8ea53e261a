use arxiv_agent_model::{
    ErrorKind, ModelCompletion, ModelFinishReason, ModelMessage, ModelRequest,
    ModelTool, NativeMessage, ToolCallRequest,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, OpenAIConfig};

// ------------------------------
// Types received from the server
// ------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionToolCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub r#type: String,
    pub function: FunctionToolCall,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    pub choices: Vec<Choice>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Choice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

// ------------------------------------------
// Wire messages (sent and received verbatim)
// ------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },
    Tool {
        tool_call_id: String,
        content: String,
    },
}

// ------------------------
// Types sent to the server
// ------------------------

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct FunctionTool {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Tool {
    r#type: &'static str,
    function: FunctionTool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    stream: bool,
}

// -----------
// Conversions
// -----------

#[inline]
pub fn create_request(
    req: &ModelRequest,
    config: &OpenAIConfig,
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: config.model.clone(),
        messages: req.messages.iter().map(create_message).collect(),
        tools: req.tools.iter().map(create_tool).collect(),
        stream: false,
    }
}

#[inline]
fn create_message(msg: &ModelMessage) -> Message {
    match msg {
        ModelMessage::System(content) => Message::System {
            content: content.clone(),
        },
        ModelMessage::User(content) => Message::User {
            content: content.clone(),
        },
        ModelMessage::Assistant(content) => Message::Assistant {
            content: Some(content.clone()),
            tool_calls: None,
        },
        ModelMessage::Tool(result) => Message::Tool {
            tool_call_id: result.id.clone(),
            content: result.content.clone(),
        },
        ModelMessage::Native(native) => {
            // Native messages from this provider always carry a `Message`.
            let Some(msg) = native.payload::<Message>() else {
                return Message::Assistant {
                    content: None,
                    tool_calls: None,
                };
            };
            msg.clone()
        }
    }
}

#[inline]
fn create_tool(tool: &ModelTool) -> Tool {
    Tool {
        r#type: "function",
        function: FunctionTool {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Converts a received payload into the neutral completion type.
///
/// The assistant message is preserved verbatim as the native form, so
/// that a follow-up request can echo an assistant turn together with the
/// tool calls it carried.
pub fn parse_completion(
    payload: ChatCompletion,
) -> Result<ModelCompletion, Error> {
    let Some(choice) = payload.choices.into_iter().next() else {
        return Err(Error::new("no choices in response", ErrorKind::Other));
    };

    let Message::Assistant {
        content,
        tool_calls,
    } = &choice.message
    else {
        return Err(Error::new(
            "response message is not an assistant turn",
            ErrorKind::Other,
        ));
    };

    let mut requests = Vec::new();
    for tool_call in tool_calls.iter().flatten() {
        let arguments = if tool_call.function.arguments.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&tool_call.function.arguments).map_err(
                |err| {
                    Error::new(
                        format!("malformed tool arguments: {err}"),
                        ErrorKind::Other,
                    )
                },
            )?
        };
        requests.push(ToolCallRequest {
            id: tool_call.id.clone(),
            name: tool_call.function.name.clone(),
            arguments,
        });
    }

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("tool_calls") => ModelFinishReason::ToolCalls,
        _ => ModelFinishReason::Stop,
    };

    let native_msg =
        Some(NativeMessage::new(payload.id, choice.message.clone()));
    Ok(ModelCompletion {
        text: content.clone().unwrap_or_default(),
        tool_calls: requests,
        finish_reason,
        native_msg,
    })
}
