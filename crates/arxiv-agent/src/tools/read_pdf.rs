use arxiv_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use lopdf::Document;
use reqwest::{Client, StatusCode};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors from the PDF reading tool.
#[derive(Debug, Error)]
pub enum ReadPdfError {
    /// The download failed before a response arrived.
    #[error("failed to fetch PDF: {0}")]
    Fetch(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("bad response while fetching PDF: {0}")]
    FetchStatus(StatusCode),
    /// The downloaded bytes are not a readable PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(#[from] lopdf::Error),
    /// The blocking extraction task panicked or was cancelled.
    #[error("PDF extraction task failed")]
    Task,
}

#[derive(Deserialize, JsonSchema)]
pub struct ReadPdfParameters {
    #[schemars(description = "URL of the PDF document to read.")]
    url: String,
}

/// A tool for reading the text content of a PDF from a URL.
pub struct ReadPdfTool {
    client: Client,
    parameter_schema: Value,
}

impl ReadPdfTool {
    /// Creates a new PDF reading tool.
    #[inline]
    pub fn new() -> Self {
        ReadPdfTool {
            client: Client::new(),
            parameter_schema: schema_for!(ReadPdfParameters).to_value(),
        }
    }
}

impl Default for ReadPdfTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ReadPdfTool {
    type Input = ReadPdfParameters;

    fn name(&self) -> &str {
        "read_pdf"
    }

    fn description(&self) -> &str {
        r#"
Read the text content of a PDF document at the given URL.
Returns the text of every page, in page order."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: ReadPdfParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        async move {
            read_pdf(&client, &input.url).await.map_err(|err| {
                ToolError::execution_failed().with_reason(format!("{err}"))
            })
        }
    }
}

async fn read_pdf(client: &Client, url: &str) -> Result<String, ReadPdfError> {
    info!("reading PDF from {url}");
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ReadPdfError::FetchStatus(status));
    }
    let bytes = resp.bytes().await?;

    // Parsing is CPU-bound and papers can be large.
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|_| ReadPdfError::Task)?
}

/// Extracts the text of every page and joins them with a newline, in
/// page order. Fails as a whole if any single page fails.
fn extract_pdf_text(bytes: &[u8]) -> Result<String, ReadPdfError> {
    let doc = Document::load_mem(bytes)?;
    let mut pages = Vec::new();
    for (page_no, _) in doc.get_pages() {
        let text = doc.extract_text(&[page_no])?;
        pages.push(text.trim().to_owned());
    }
    Ok(pages.join("\n").trim().to_owned())
}
