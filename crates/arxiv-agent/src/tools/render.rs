use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arxiv_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

const COMPILER_NAME: &str = "tectonic";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Distinguishes concurrent renders within the same wall-clock second.
static RENDER_SEQ: AtomicU64 = AtomicU64::new(0);

/// Errors from the LaTeX rendering tool.
#[derive(Debug, Error)]
pub enum RenderError {
    /// No usable LaTeX compiler was found.
    #[error("LaTeX compiler not found, install tectonic or configure \
             an explicit compiler path")]
    CompilerNotFound,
    /// A filesystem operation failed.
    #[error("render I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The compiler did not finish within the configured timeout.
    #[error("LaTeX compiler timed out after {0:?}")]
    Timeout(Duration),
    /// The compiler ran but produced no PDF.
    #[error("failed to render LaTeX document:\n{0}")]
    RenderFailed(String),
}

/// Configuration for the LaTeX rendering tool.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Explicit path to the compiler binary. When absent, `tectonic`
    /// is looked up on `PATH`.
    pub compiler: Option<PathBuf>,
    /// Directory the `.tex` source and rendered PDF are written to.
    pub output_dir: PathBuf,
    /// Wall-clock budget for one compiler run.
    pub timeout: Duration,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            compiler: None,
            output_dir: PathBuf::from("output"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct RenderLatexParameters {
    #[schemars(description = "Complete LaTeX document content to render.")]
    latex_content: String,
}

/// A tool for rendering a LaTeX document into a PDF on disk.
pub struct RenderLatexTool {
    config: RenderConfig,
    parameter_schema: Value,
}

impl RenderLatexTool {
    /// Creates a new rendering tool with the given configuration.
    #[inline]
    pub fn new(config: RenderConfig) -> Self {
        RenderLatexTool {
            config,
            parameter_schema: schema_for!(RenderLatexParameters).to_value(),
        }
    }
}

impl Default for RenderLatexTool {
    #[inline]
    fn default() -> Self {
        Self::new(RenderConfig::default())
    }
}

impl Tool for RenderLatexTool {
    type Input = RenderLatexParameters;

    fn name(&self) -> &str {
        "render_latex_pdf"
    }

    fn description(&self) -> &str {
        r#"
Render a complete LaTeX document to a PDF file.
Returns the absolute path of the rendered PDF."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: RenderLatexParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let config = self.config.clone();
        async move {
            let path = render_latex(&config, &input.latex_content)
                .await
                .map_err(|err| {
                    ToolError::execution_failed()
                        .with_reason(format!("{err}"))
                })?;
            Ok(format!("PDF rendered successfully at {}", path.display()))
        }
    }
}

async fn render_latex(
    config: &RenderConfig,
    latex_content: &str,
) -> Result<PathBuf, RenderError> {
    // Resolved up front so a missing compiler leaves no files behind.
    let compiler = resolve_compiler(config)?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let output_dir = tokio::fs::canonicalize(&config.output_dir).await?;

    let tex_filename = unique_tex_filename();
    let tex_path = output_dir.join(&tex_filename);
    tokio::fs::write(&tex_path, latex_content).await?;
    info!("rendering {}", tex_path.display());

    let run = Command::new(&compiler)
        .arg(&tex_filename)
        .arg("--outdir")
        .arg(&output_dir)
        .current_dir(&output_dir)
        .output();
    let output = tokio::time::timeout(config.timeout, run)
        .await
        .map_err(|_| RenderError::Timeout(config.timeout))??;

    let pdf_path = tex_path.with_extension("pdf");
    if !output.status.success() || !tokio::fs::try_exists(&pdf_path).await? {
        return Err(RenderError::RenderFailed(format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )));
    }
    info!("rendered {}", pdf_path.display());
    Ok(pdf_path)
}

fn resolve_compiler(config: &RenderConfig) -> Result<PathBuf, RenderError> {
    if let Some(compiler) = &config.compiler {
        if compiler.is_file() {
            return Ok(compiler.clone());
        }
        return Err(RenderError::CompilerNotFound);
    }
    let path = env::var_os("PATH").ok_or(RenderError::CompilerNotFound)?;
    env::split_paths(&path)
        .map(|dir| dir.join(COMPILER_NAME))
        .find(|candidate| candidate.is_file())
        .ok_or(RenderError::CompilerNotFound)
}

/// Names are unique per process even within one second.
fn unique_tex_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let seq = RENDER_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("paper_{timestamp}_{seq}.tex")
}
