use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;

use arxiv_agent_model::{
    ErrorKind, ModelCompletion, ModelFinishReason, ModelMessage,
    ModelProvider, ModelProviderError, ModelRequest,
};

#[derive(Debug)]
struct FakeProviderError(ErrorKind);

impl Display for FakeProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl Error for FakeProviderError {}

impl ModelProviderError for FakeProviderError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Echoes the latest user message back as the assistant reply.
struct EchoProvider;

impl ModelProvider for EchoProvider {
    type Error = FakeProviderError;

    fn complete(
        &self,
        req: &ModelRequest,
    ) -> impl Future<Output = Result<ModelCompletion, Self::Error>> + Send + 'static
    {
        let result = 'blk: {
            let last_user = req.messages.iter().rev().find_map(|msg| {
                if let ModelMessage::User(text) = msg {
                    Some(text.as_str())
                } else {
                    None
                }
            });
            let Some(input) = last_user else {
                break 'blk Err(FakeProviderError(ErrorKind::Other));
            };

            Ok(ModelCompletion {
                text: format!("You said {input}"),
                tool_calls: vec![],
                finish_reason: ModelFinishReason::Stop,
                native_msg: None,
            })
        };
        ready(result)
    }
}

#[tokio::test]
async fn test_completion() {
    let provider = EchoProvider;
    let req = ModelRequest {
        messages: vec![ModelMessage::User("Good morning".to_owned())],
        tools: vec![],
    };
    let completion = provider.complete(&req).await.unwrap();
    assert_eq!(completion.text, "You said Good morning");
    assert!(completion.is_reply());
}

#[tokio::test]
async fn test_error() {
    let provider = EchoProvider;
    let req = ModelRequest {
        messages: vec![],
        tools: vec![],
    };
    let err = provider.complete(&req).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
}
