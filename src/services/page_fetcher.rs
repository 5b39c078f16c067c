// Page Fetcher Service
// Downloads result pages and extracts their main paragraph text

use crate::services::config_store::FetchConfig;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Node, Selector};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Tags whose content never counts as page text
const EXCLUDED_TAGS: [&str; 6] = ["script", "style", "nav", "header", "footer", "aside"];

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Unexpected status {0}")]
    Status(u16),
    #[error("Timed out after {0}s")]
    Timeout(u64),
    #[error("No paragraph text found")]
    EmptyContent,
}

/// Fetches a URL and returns the readable paragraph text of the page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

pub struct HttpPageFetcher {
    client: Client,
    max_chars: usize,
}

impl HttpPageFetcher {
    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            max_chars: config.max_chars,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let html = String::from_utf8_lossy(&bytes);
        let text = extract_main_text(&html, self.max_chars).ok_or(FetchError::EmptyContent)?;

        debug!("[FETCH] url={} bytes={} chars={}", url, bytes.len(), text.chars().count());
        Ok(text)
    }
}

struct ContentSelectors {
    containers: [Selector; 3],
    paragraph: Selector,
}

fn selectors() -> &'static ContentSelectors {
    static SELECTORS: OnceLock<ContentSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| ContentSelectors {
        containers: [
            Selector::parse("main").expect("main selector"),
            Selector::parse("article").expect("article selector"),
            Selector::parse("body").expect("body selector"),
        ],
        paragraph: Selector::parse("p").expect("paragraph selector"),
    })
}

fn is_excluded(node: &Node) -> bool {
    node.as_element()
        .map_or(false, |el| EXCLUDED_TAGS.contains(&el.name()))
}

/// Text of an element, skipping anything nested in an excluded tag
fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in el.descendants() {
        if let Some(text) = node.value().as_text() {
            if !node.ancestors().any(|a| is_excluded(a.value())) {
                out.push_str(text);
            }
        }
    }
    out
}

/// Pick the main content container (`main`, then `article`, then `body`),
/// join its trimmed `<p>` texts with spaces and bound the result to
/// `max_chars` characters. Returns `None` when no paragraph text remains.
pub fn extract_main_text(html: &str, max_chars: usize) -> Option<String> {
    let doc = Html::parse_document(html);
    let sel = selectors();

    let container = sel
        .containers
        .iter()
        .find_map(|s| {
            doc.select(s)
                .find(|el| !el.ancestors().any(|a| is_excluded(a.value())))
        })?;

    let paragraphs: Vec<String> = container
        .select(&sel.paragraph)
        .map(|p| visible_text(p).trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    let text: String = paragraphs.join(" ").chars().take(max_chars).collect();
    (!text.is_empty()).then_some(text)
}
