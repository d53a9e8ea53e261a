mod builder;
#[cfg(test)]
mod tests;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;
use std::time::Duration;

use arxiv_agent_model::{
    ModelCompletion, ModelMessage, ModelProviderError, ModelRequest,
    ToolCallRequest, ToolCallResult,
};
use tokio::time::timeout;

pub use builder::AgentBuilder;

use crate::checkpoint::{CheckpointStore, ThreadId};
use crate::conversation::Conversation;
use crate::model_client::ModelClient;
use crate::tool::{self, Registry};

type ReplyHook = Box<dyn Fn(&str) + Send + Sync>;
type ToolCallHook = Box<dyn Fn(&ToolCallRequest) + Send + Sync>;

/// The error type for a failed agent run.
///
/// Tool execution failures never surface here; they are reported back to
/// the model as tool results so it can decide how to proceed. What does
/// surface is everything the model cannot recover from on its own.
#[derive(Debug)]
pub enum RunError {
    /// The model gateway failed (transport, auth, rate limit).
    Gateway(Box<dyn ModelProviderError>),
    /// The model gateway did not answer within the configured timeout.
    ModelTimeout,
    /// A tool call request could not be dispatched (unknown tool or
    /// arguments that don't match the schema).
    Tool(tool::Error),
    /// The conversation did not reach a plain reply within the round cap.
    RoundLimitExceeded,
}

impl Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Gateway(err) => write!(f, "model gateway error: {err}"),
            RunError::ModelTimeout => write!(f, "model call timed out"),
            RunError::Tool(err) => write!(f, "tool dispatch error: {err}"),
            RunError::RoundLimitExceeded => {
                write!(f, "round limit exceeded without a plain reply")
            }
        }
    }
}

impl StdError for RunError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            RunError::Gateway(err) => Some(err.as_ref()),
            RunError::Tool(err) => Some(err),
            _ => None,
        }
    }
}

/// The tool-calling agent loop.
///
/// An agent owns one conversation and drives it to a plain reply: it
/// calls the model, executes whatever tool calls the reply carries,
/// appends the results, and calls the model again. The two states it
/// alternates between are "awaiting model" and "awaiting tools"; a round
/// cap bounds the alternation.
///
/// Each agent is a single logical thread of control. Independent
/// conversations get independent agents; the only thing worth sharing
/// between them is a checkpoint store.
pub struct Agent {
    model_client: ModelClient,
    registry: Registry,
    conversation: Conversation,
    system_prompt: Option<String>,
    checkpointer: Option<(Arc<dyn CheckpointStore>, ThreadId)>,
    max_rounds: usize,
    model_timeout: Option<Duration>,
    on_reply: Option<ReplyHook>,
    on_tool_call: Option<ToolCallHook>,
}

impl Agent {
    /// Runs the loop for one user input and returns the assistant's
    /// plain reply.
    ///
    /// The input is appended to the conversation before the first model
    /// call (preceded by the system prompt if this is the first turn).
    /// The conversation is checkpointed after every completed round, so
    /// an aborted run still leaves consistent state behind.
    pub async fn run(
        &mut self,
        input: impl Into<String>,
    ) -> Result<String, RunError> {
        if self.conversation.is_empty() {
            if let Some(prompt) = &self.system_prompt {
                self.conversation
                    .push(ModelMessage::System(prompt.clone()));
            }
        }
        self.conversation.push(ModelMessage::User(input.into()));

        for round in 0..self.max_rounds {
            debug!("starting round {round}");

            // Awaiting-model state.
            let completion = self.call_model().await?;
            let assistant_msg = match completion.native_msg.clone() {
                Some(native) => ModelMessage::Native(native),
                None => ModelMessage::Assistant(completion.text.clone()),
            };
            self.conversation.push(assistant_msg);

            if !completion.text.is_empty() {
                if let Some(on_reply) = &self.on_reply {
                    on_reply(&completion.text);
                }
            }

            if completion.is_reply() {
                self.checkpoint();
                return Ok(completion.text);
            }

            // Awaiting-tools state. Every request gets exactly one result
            // appended before the next model call; the model never sees a
            // partial result set.
            let tools_result = self.run_tools(&completion).await;
            self.checkpoint();
            tools_result?;
        }

        warn!("round limit ({}) exceeded", self.max_rounds);
        Err(RunError::RoundLimitExceeded)
    }

    async fn call_model(&self) -> Result<ModelCompletion, RunError> {
        let request = ModelRequest {
            messages: self.conversation.messages().to_vec(),
            tools: self.registry.definitions(),
        };
        let fut = self.model_client.complete(request);
        let result = match self.model_timeout {
            Some(limit) => timeout(limit, fut)
                .await
                .map_err(|_| RunError::ModelTimeout)?,
            None => fut.await,
        };
        result.map_err(RunError::Gateway)
    }

    async fn run_tools(
        &mut self,
        completion: &ModelCompletion,
    ) -> Result<(), RunError> {
        for (idx, req) in completion.tool_calls.iter().enumerate() {
            if let Some(on_tool_call) = &self.on_tool_call {
                on_tool_call(req);
            }

            let fut = match self.registry.dispatch(req) {
                Ok(fut) => fut,
                Err(err) => {
                    // The conversation must stay well-formed even on an
                    // aborted round: every request still gets answered, or
                    // the next run would re-send dangling tool calls.
                    for unanswered in &completion.tool_calls[idx..] {
                        self.conversation.push(ModelMessage::Tool(
                            ToolCallResult {
                                id: unanswered.id.clone(),
                                content: format!(
                                    "Tool error: {}",
                                    err.reason()
                                ),
                            },
                        ));
                    }
                    return Err(RunError::Tool(err));
                }
            };
            let content = match fut.await {
                Ok(output) => output,
                Err(err) => {
                    // Surfaced to the model as data; it may retry with
                    // different arguments or apologize to the user.
                    warn!("tool {} failed: {err}", req.name);
                    format!("Tool error: {}", err.reason())
                }
            };
            self.conversation.push(ModelMessage::Tool(ToolCallResult {
                id: req.id.clone(),
                content,
            }));
        }
        Ok(())
    }

    fn checkpoint(&self) {
        if let Some((store, thread)) = &self.checkpointer {
            store.save(thread, &self.conversation);
        }
    }
}

impl Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("conversation", &self.conversation)
            .field("max_rounds", &self.max_rounds)
            .field("model_timeout", &self.model_timeout)
            .finish_non_exhaustive()
    }
}
