//! A terminal front-end for the research agent.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use arxiv_agent::SessionBuilder;
use arxiv_agent::tools::RenderConfig;
use arxiv_agent_openai_model::{OpenAIConfigBuilder, OpenAIProvider};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";

/// Holds the spinner of the in-flight turn so the reply and tool-call
/// hooks can print without tearing it.
#[derive(Clone, Default)]
struct Spinner(Arc<Mutex<Option<ProgressBar>>>);

impl Spinner {
    fn start(&self) {
        let progress_bar = ProgressBar::with_draw_target(
            None,
            ProgressDrawTarget::stderr(),
        );
        progress_bar.set_style(
            ProgressStyle::with_template("{spinner} {wide_msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));
        *self.0.lock().unwrap() = Some(progress_bar);
    }

    fn stop(&self) {
        if let Some(progress_bar) = self.0.lock().unwrap().take() {
            progress_bar.finish_and_clear();
        }
    }

    fn println(&self, line: impl FnOnce() -> String) {
        match &*self.0.lock().unwrap() {
            Some(progress_bar) => progress_bar.suspend(|| {
                println!("{}", line());
            }),
            None => println!("{}", line()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Ok(api_key) = env::var("OPENAI_API_KEY") else {
        eprintln!("OPENAI_API_KEY environment variable is not set");
        return;
    };
    let Ok(base_url) = env::var("OPENAI_BASE_URL") else {
        eprintln!("OPENAI_BASE_URL environment variable is not set");
        return;
    };
    let Ok(model) = env::var("OPENAI_MODEL") else {
        eprintln!("OPENAI_MODEL environment variable is not set");
        return;
    };

    let config = OpenAIConfigBuilder::with_api_key(api_key)
        .with_base_url(base_url)
        .with_model(model)
        .build();
    let model_provider = OpenAIProvider::new(config);

    let spinner = Spinner::default();
    let mut session = SessionBuilder::with_model_provider(model_provider)
        .with_render_config(render_config_from_env())
        .on_reply({
            let spinner = spinner.clone();
            move |reply| {
                let reply = reply.to_owned();
                spinner.println(|| {
                    format!(
                        "{}🤖 {}",
                        BAR_CHAR.bright_cyan(),
                        reply.bright_white()
                    )
                });
            }
        })
        .on_tool_call({
            let spinner = spinner.clone();
            move |tool_call| {
                let name = tool_call.name.clone();
                spinner.println(|| {
                    format!(
                        "{}🔧 Using tool: {}",
                        BAR_CHAR.bright_yellow(),
                        name.bright_white()
                    )
                });
            }
        })
        .build();

    loop {
        print!("> ");
        std::io::stdout().flush().unwrap();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        spinner.start();
        let result = session.send_message(line).await;
        spinner.stop();

        // The reply itself was already printed by the hook.
        if let Err(err) = result {
            println!("{}", format!("error: {err}").bright_red());
        }
        println!();
    }
}

fn render_config_from_env() -> RenderConfig {
    let mut config = RenderConfig::default();
    if let Some(output_dir) = env::var_os("ARXIV_AGENT_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(output_dir);
    }
    if let Some(compiler) = env::var_os("TECTONIC_PATH") {
        config.compiler = Some(PathBuf::from(compiler));
    }
    config
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
