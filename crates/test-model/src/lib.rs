//! A local fake model for testing purpose.

mod preset;

use std::error::Error as StdError;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::Duration;

use arxiv_agent_model::{
    ErrorKind, ModelCompletion, ModelFinishReason, ModelProvider,
    ModelProviderError, ModelRequest, NativeMessage,
};
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: &'static str,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.message, self.kind)
    }
}

impl StdError for Error {}

impl ModelProviderError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

#[derive(Clone)]
enum ConversationStep {
    Input,
    Reply(PresetReply),
}

/// A local fake model for testing purpose.
///
/// Before sending requests, you need to set up the conversation script,
/// which is how the model should respond to a request. The step is
/// selected by the number of history messages in the request: every
/// host-side message (system prompt, user input, tool result) occupies an
/// `Input` step, and every model turn occupies a `Reply` step. Requests
/// that run past the script fail with an error.
///
/// # Note
///
/// This type is not optimized for production use, the whole script is
/// cloned into every response. You should only use it for testing.
#[derive(Clone, Default)]
pub struct TestModelProvider {
    script: Vec<ConversationStep>,
    delay: Option<Duration>,
}

impl TestModelProvider {
    /// Appends a host-side step (system prompt, user input, or one tool
    /// result) to the script.
    #[inline]
    pub fn add_input_step(&mut self) {
        self.script.push(ConversationStep::Input);
    }

    /// Appends `n` host-side steps to the script.
    #[inline]
    pub fn add_input_steps(&mut self, n: usize) {
        for _ in 0..n {
            self.add_input_step();
        }
    }

    /// Appends an assistant step to the script.
    #[inline]
    pub fn add_reply_step(&mut self, preset: PresetReply) {
        self.script.push(ConversationStep::Reply(preset));
    }

    /// Delays every response by the given duration.
    #[inline]
    pub fn set_delay(&mut self, duration: Duration) {
        self.delay = Some(duration);
    }

    fn step_for(&self, req: &ModelRequest) -> Result<&PresetReply, Error> {
        let step_idx = req.messages.len();
        let Some(step) = self.script.get(step_idx) else {
            return Err(Error {
                message: "no enough steps",
                kind: ErrorKind::Other,
            });
        };
        match step {
            ConversationStep::Input => Err(Error {
                message: "not an assistant step",
                kind: ErrorKind::Other,
            }),
            ConversationStep::Reply(preset) => Ok(preset),
        }
    }
}

impl ModelProvider for TestModelProvider {
    type Error = Error;

    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static
    {
        let step_idx = req.messages.len();
        let result = self.step_for(req).map(PresetReply::clone);
        let delay = self.delay;

        async move {
            if let Some(delay) = delay {
                sleep(delay).await;
            }

            let preset = result?;
            if let Some(kind) = preset.error {
                return Err(Error {
                    message: "scripted failure",
                    kind,
                });
            }

            let finish_reason = if preset.tool_calls.is_empty() {
                ModelFinishReason::Stop
            } else {
                ModelFinishReason::ToolCalls
            };
            let native_msg = Some(NativeMessage::new(
                format!("msg:{step_idx}"),
                preset.clone(),
            ));
            Ok(ModelCompletion {
                text: preset.text,
                tool_calls: preset.tool_calls,
                finish_reason,
                native_msg,
            })
        }
    }
}
