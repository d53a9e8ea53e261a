use std::sync::{Arc, Mutex};
use std::time::Duration;

use arxiv_agent_model::{ErrorKind as GatewayErrorKind, ToolCallRequest};
use arxiv_agent_test_model::{PresetReply, TestModelProvider};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::checkpoint::{CheckpointStore, MemorySaver};
use crate::tool::{
    Error as ToolError, ErrorKind as ToolErrorKind, Tool, ToolResult,
};
use crate::{AgentBuilder, RunError};

static PROBE_SCHEMA: &Value = &Value::Null;

#[derive(Deserialize)]
struct ProbeInput {
    tag: String,
}

/// A tool that records every invocation; a `"boom"` tag makes it fail.
struct ProbeTool {
    log: Arc<Mutex<Vec<String>>>,
}

impl Tool for ProbeTool {
    type Input = ProbeInput;

    fn name(&self) -> &str {
        "probe"
    }

    fn description(&self) -> &str {
        "A probe tool"
    }

    fn parameter_schema(&self) -> &Value {
        PROBE_SCHEMA
    }

    fn execute(
        &self,
        input: ProbeInput,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let log = Arc::clone(&self.log);
        async move {
            log.lock().unwrap().push(input.tag.clone());
            if input.tag == "boom" {
                Err(ToolError::execution_failed().with_reason("probe blew up"))
            } else {
                Ok(format!("ok:{}", input.tag))
            }
        }
    }
}

fn probe_call(id: &str, tag: &str) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_owned(),
        name: "probe".to_owned(),
        arguments: json!({ "tag": tag }),
    }
}

#[tokio::test]
async fn test_plain_reply_is_terminal() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_text("Hi, what can I do?"));

    let mut agent = AgentBuilder::with_model_provider(provider).build();
    let reply = agent.run("Hello").await.unwrap();
    assert_eq!(reply, "Hi, what can I do?");
}

#[tokio::test]
async fn test_tool_round_trip() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_tool_calls([
        probe_call("tool:1", "alpha"),
        probe_call("tool:2", "beta"),
    ]));
    // Both tool results must land in the conversation before this step is
    // reachable; the scripted provider selects steps by message count.
    provider.add_input_steps(2);
    provider.add_reply_step(PresetReply::with_text("Done"));

    let log = Arc::new(Mutex::new(vec![]));
    let notified = Arc::new(Mutex::new(vec![]));
    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_tool(ProbeTool {
            log: Arc::clone(&log),
        })
        .on_tool_call({
            let notified = Arc::clone(&notified);
            move |req: &ToolCallRequest| {
                notified.lock().unwrap().push(req.id.clone());
            }
        })
        .build();

    let reply = agent.run("Probe twice").await.unwrap();
    assert_eq!(reply, "Done");
    assert_eq!(*log.lock().unwrap(), ["alpha", "beta"]);
    assert_eq!(*notified.lock().unwrap(), ["tool:1", "tool:2"]);
}

#[tokio::test]
async fn test_failing_tool_does_not_abort() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_tool_calls([
        probe_call("tool:1", "boom"),
        probe_call("tool:2", "beta"),
    ]));
    provider.add_input_steps(2);
    provider.add_reply_step(PresetReply::with_text("Recovered"));

    let log = Arc::new(Mutex::new(vec![]));
    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_tool(ProbeTool {
            log: Arc::clone(&log),
        })
        .build();

    let reply = agent.run("Probe").await.unwrap();
    assert_eq!(reply, "Recovered");
    // The failed call still produced a result message and the loop moved
    // on to the remaining call.
    assert_eq!(*log.lock().unwrap(), ["boom", "beta"]);
}

#[tokio::test]
async fn test_unknown_tool_aborts_the_run() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_tool_calls([ToolCallRequest {
        id: "tool:1".to_owned(),
        name: "teleport".to_owned(),
        arguments: json!({}),
    }]));

    let mut agent = AgentBuilder::with_model_provider(provider).build();
    let err = agent.run("Do something").await.unwrap_err();
    let RunError::Tool(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.kind(), ToolErrorKind::UnknownTool);
}

#[tokio::test]
async fn test_invalid_arguments_abort_the_run() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_tool_calls([ToolCallRequest {
        id: "tool:1".to_owned(),
        name: "probe".to_owned(),
        arguments: json!({ "tag": [1, 2, 3] }),
    }]));

    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_tool(ProbeTool {
            log: Arc::new(Mutex::new(vec![])),
        })
        .build();
    let err = agent.run("Do something").await.unwrap_err();
    let RunError::Tool(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.kind(), ToolErrorKind::InvalidArguments);
}

#[tokio::test]
async fn test_aborted_dispatch_answers_pending_tool_calls() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_tool_calls([
        ToolCallRequest {
            id: "tool:1".to_owned(),
            name: "teleport".to_owned(),
            arguments: json!({}),
        },
        probe_call("tool:2", "beta"),
    ]));
    // Both requests of the aborted round must have been answered, or the
    // resumed run would sit at the wrong script position.
    provider.add_input_steps(3);
    provider.add_reply_step(PresetReply::with_text("Recovered"));

    let log = Arc::new(Mutex::new(vec![]));
    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_tool(ProbeTool {
            log: Arc::clone(&log),
        })
        .build();

    let err = agent.run("go").await.unwrap_err();
    let RunError::Tool(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.kind(), ToolErrorKind::UnknownTool);
    assert!(log.lock().unwrap().is_empty());

    assert_eq!(agent.run("again").await.unwrap(), "Recovered");
}

#[tokio::test]
async fn test_round_limit() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider
        .add_reply_step(PresetReply::with_tool_calls([probe_call(
            "tool:1", "a",
        )]));
    provider.add_input_step();
    provider
        .add_reply_step(PresetReply::with_tool_calls([probe_call(
            "tool:2", "b",
        )]));
    provider.add_input_step();

    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_tool(ProbeTool {
            log: Arc::new(Mutex::new(vec![])),
        })
        .with_max_rounds(2)
        .build();
    let err = agent.run("Loop forever").await.unwrap_err();
    assert!(matches!(err, RunError::RoundLimitExceeded));
}

#[tokio::test]
async fn test_gateway_failure_surfaces() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::failure(
        GatewayErrorKind::RateLimitExceeded,
    ));

    let mut agent = AgentBuilder::with_model_provider(provider).build();
    let err = agent.run("Hello").await.unwrap_err();
    let RunError::Gateway(err) = err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(err.kind(), GatewayErrorKind::RateLimitExceeded);
}

#[tokio::test(start_paused = true)]
async fn test_model_timeout() {
    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_text("Too late"));
    provider.set_delay(Duration::from_millis(200));

    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_model_timeout(Duration::from_millis(100))
        .build();
    let err = agent.run("Hello").await.unwrap_err();
    assert!(matches!(err, RunError::ModelTimeout));
}

#[tokio::test]
async fn test_checkpoint_resume() {
    let store: Arc<dyn CheckpointStore> = Arc::new(MemorySaver::new());

    let mut provider = TestModelProvider::default();
    provider.add_input_step();
    provider.add_reply_step(PresetReply::with_text("First"));

    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_checkpointer(Arc::clone(&store), "thread:42")
        .build();
    assert_eq!(agent.run("Hello").await.unwrap(), "First");
    drop(agent);

    // A new agent on the same thread resumes with the saved two-message
    // history, so the scripted reply sits after three input steps.
    let mut provider = TestModelProvider::default();
    provider.add_input_steps(3);
    provider.add_reply_step(PresetReply::with_text("Second"));

    let mut agent = AgentBuilder::with_model_provider(provider)
        .with_checkpointer(store, "thread:42")
        .build();
    assert_eq!(agent.run("And again").await.unwrap(), "Second");
}
