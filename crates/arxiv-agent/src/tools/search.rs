use arxiv_agent_core::tool::{Error as ToolError, Tool, ToolResult};
use reqwest::{Client, StatusCode};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const DEFAULT_MAX_RESULTS: u32 = 5;

/// Errors from the arXiv search tool.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The normalized query still contains a character the query string
    /// cannot carry.
    #[error("cannot have character {ch:?} in query: {query}")]
    InvalidQuery {
        /// The offending character.
        ch: char,
        /// The normalized query.
        query: String,
    },
    /// The HTTP request itself failed.
    #[error("arXiv request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The endpoint answered with a non-success status.
    #[error("bad response from arXiv API ({status}): {body}")]
    Upstream {
        /// The response status.
        status: StatusCode,
        /// The response body, for diagnosis.
        body: String,
    },
    /// The feed payload did not parse.
    #[error("malformed arXiv feed: {0}")]
    Feed(#[from] quick_xml::DeError),
    /// The feed parsed but contained zero entries.
    #[error("no papers found for topic: {0}")]
    NoResults(String),
}

/// One paper parsed from the arXiv feed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Paper {
    /// The paper title.
    pub title: String,
    /// The abstract, surrounding whitespace trimmed.
    pub summary: String,
    /// Author names, in feed order.
    pub authors: Vec<String>,
    /// arXiv category terms.
    pub categories: Vec<String>,
    /// Link to the PDF, absent when the entry declares none.
    pub pdf: Option<String>,
}

/// Configuration for the arXiv endpoint.
#[derive(Clone, Debug)]
pub struct ArxivConfig {
    /// Base URL of the query endpoint.
    pub base_url: String,
}

impl Default for ArxivConfig {
    #[inline]
    fn default() -> Self {
        Self {
            base_url: "http://export.arxiv.org/api/query".to_owned(),
        }
    }
}

#[derive(Deserialize, JsonSchema)]
pub struct ArxivSearchParameters {
    #[schemars(description = "The topic to search for papers about.")]
    topic: String,
    #[schemars(description = "Maximum number of papers to return, \
                              default to 5.")]
    max_results: Option<u32>,
}

/// A tool for searching recently uploaded arXiv papers.
pub struct ArxivSearchTool {
    config: ArxivConfig,
    client: Client,
    parameter_schema: Value,
}

impl ArxivSearchTool {
    /// Creates a new search tool against the given endpoint.
    #[inline]
    pub fn new(config: ArxivConfig) -> Self {
        ArxivSearchTool {
            config,
            client: Client::new(),
            parameter_schema: schema_for!(ArxivSearchParameters).to_value(),
        }
    }
}

impl Default for ArxivSearchTool {
    #[inline]
    fn default() -> Self {
        Self::new(ArxivConfig::default())
    }
}

impl Tool for ArxivSearchTool {
    type Input = ArxivSearchParameters;

    fn name(&self) -> &str {
        "arxiv_search"
    }

    fn description(&self) -> &str {
        r#"
Search for recently uploaded arXiv papers about a topic.
Returns a JSON list of papers with title, summary, authors, categories and a PDF link."#
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: ArxivSearchParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let client = self.client.clone();
        let config = self.config.clone();
        async move {
            let max_results =
                input.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
            let papers =
                search_papers(&client, &config, &input.topic, max_results)
                    .await
                    .map_err(|err| {
                        ToolError::execution_failed()
                            .with_reason(format!("{err}"))
                    })?;
            serde_json::to_string_pretty(&papers).map_err(|err| {
                ToolError::execution_failed().with_reason(format!("{err}"))
            })
        }
    }
}

async fn search_papers(
    client: &Client,
    config: &ArxivConfig,
    topic: &str,
    max_results: u32,
) -> Result<Vec<Paper>, SearchError> {
    let query = build_query(topic)?;
    let url = format!(
        "{}?search_query=all:{query}\
         &max_results={max_results}\
         &sortBy=submittedDate&sortOrder=descending",
        config.base_url
    );
    info!("searching arXiv: {url}");

    let resp = client.get(&url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SearchError::Upstream { status, body });
    }

    let papers = parse_feed(&resp.text().await?)?;
    if papers.is_empty() {
        return Err(SearchError::NoResults(topic.to_owned()));
    }
    info!("found {} papers about {topic}", papers.len());
    Ok(papers)
}

/// Normalizes a topic into the query string: lowercased, whitespace
/// joined by `+`. Characters that would break the request are rejected
/// rather than escaped.
fn build_query(topic: &str) -> Result<String, SearchError> {
    let query = topic
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("+");
    for ch in ['(', ')', '"', ' '] {
        if query.contains(ch) {
            return Err(SearchError::InvalidQuery { ch, query });
        }
    }
    Ok(query)
}

// Atom feed shapes, only the parts we keep.

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default, rename = "entry")]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: String,
    summary: String,
    #[serde(default, rename = "author")]
    authors: Vec<Author>,
    #[serde(default, rename = "category")]
    categories: Vec<Category>,
    #[serde(default, rename = "link")]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Category {
    #[serde(rename = "@term")]
    term: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@type")]
    media_type: Option<String>,
    #[serde(rename = "@href")]
    href: String,
}

fn parse_feed(xml: &str) -> Result<Vec<Paper>, quick_xml::DeError> {
    let feed: Feed = quick_xml::de::from_str(xml)?;
    let papers = feed
        .entries
        .into_iter()
        .map(|entry| {
            let pdf = entry
                .links
                .into_iter()
                .find(|link| {
                    link.media_type.as_deref() == Some("application/pdf")
                })
                .map(|link| link.href);
            Paper {
                title: entry.title,
                summary: entry.summary.trim().to_owned(),
                authors: entry
                    .authors
                    .into_iter()
                    .map(|author| author.name)
                    .collect(),
                categories: entry
                    .categories
                    .into_iter()
                    .map(|category| category.term)
                    .collect(),
                pdf,
            }
        })
        .collect();
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    const EMPTY_FEED: &str =
        r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#;

    /// Serves exactly one HTTP response and returns the endpoint URL.
    async fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let response = format!(
            "HTTP/1.1 {status_line}\r\n\
             content-length: {}\r\n\
             connection: close\r\n\r\n{body}",
            body.len()
        );
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            stream.write_all(response.as_bytes()).await.unwrap();
        });

        format!("http://{addr}")
    }

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query: search_query=all:electron</title>
  <entry>
    <title>Electrons in motion</title>
    <summary>
      We study electrons.
    </summary>
    <author><name>A. Ampere</name></author>
    <author><name>B. Becquerel</name></author>
    <category term="physics.acc-ph"/>
    <category term="cond-mat.supr-con"/>
    <link href="http://arxiv.org/abs/1234.5678" rel="alternate" type="text/html"/>
    <link href="http://arxiv.org/pdf/1234.5678" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <title>No PDF here</title>
    <summary>An entry without a PDF link.</summary>
    <author><name>C. Curie</name></author>
    <category term="math.CO"/>
    <link href="http://arxiv.org/abs/9999.0001" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn test_build_query_normalizes() {
        assert_eq!(build_query("Quantum Computing").unwrap(), "quantum+computing");
        assert_eq!(build_query("  spaced   out  ").unwrap(), "spaced+out");
    }

    #[test]
    fn test_build_query_rejects_bad_characters() {
        let err = build_query("graphs (directed)").unwrap_err();
        let SearchError::InvalidQuery { ch, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(ch, '(');

        assert!(build_query(r#""exact phrase""#).is_err());
    }

    #[test]
    fn test_parse_feed() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let first = &papers[0];
        assert_eq!(first.title, "Electrons in motion");
        assert_eq!(first.summary, "We study electrons.");
        assert_eq!(first.authors, ["A. Ampere", "B. Becquerel"]);
        assert_eq!(first.categories, ["physics.acc-ph", "cond-mat.supr-con"]);
        assert_eq!(first.pdf.as_deref(), Some("http://arxiv.org/pdf/1234.5678"));

        let second = &papers[1];
        assert_eq!(second.authors, ["C. Curie"]);
        assert_eq!(second.pdf, None);
    }

    #[test]
    fn test_parse_empty_feed() {
        let papers = parse_feed(EMPTY_FEED).unwrap();
        assert!(papers.is_empty());
    }

    #[tokio::test]
    async fn test_empty_feed_is_no_results() {
        let config = ArxivConfig {
            base_url: serve_once("200 OK", EMPTY_FEED).await,
        };
        let err = search_papers(&Client::new(), &config, "unobtainium", 5)
            .await
            .unwrap_err();
        let SearchError::NoResults(topic) = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(topic, "unobtainium");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream() {
        let config = ArxivConfig {
            base_url: serve_once("503 Service Unavailable", "overloaded")
                .await,
        };
        let err = search_papers(&Client::new(), &config, "electrons", 5)
            .await
            .unwrap_err();
        let SearchError::Upstream { status, body } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(status.as_u16(), 503);
        assert_eq!(body, "overloaded");
    }
}
