// Web Search Service
// DuckDuckGo HTML search, parsed into ranked {title, link, snippet} results

use crate::models::SearchResult;
use crate::services::config_store::SearchConfig;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Search API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Invalid search endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Search provider returning ranked results for a query.
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError>;
}

pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: url::Url,
}

impl DuckDuckGoSearch {
    pub fn from_config(config: &SearchConfig, user_agent: &str) -> Result<Self, SearchError> {
        let endpoint = url::Url::parse(&config.endpoint).map_err(|e| SearchError::InvalidEndpoint {
            url: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("q", query);

        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let html = response.text().await?;
        let results = parse_results(&html, max_results);

        info!(
            "[SEARCH] results={} query_chars={} latency_ms={}",
            results.len(),
            query.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(results)
    }
}

struct ResultSelectors {
    result: Selector,
    title: Selector,
    snippet: Selector,
}

fn selectors() -> &'static ResultSelectors {
    static SELECTORS: OnceLock<ResultSelectors> = OnceLock::new();
    SELECTORS.get_or_init(|| ResultSelectors {
        result: Selector::parse("div.result").expect("result selector"),
        title: Selector::parse("a.result__a").expect("title selector"),
        snippet: Selector::parse(".result__snippet").expect("snippet selector"),
    })
}

fn collapsed_text(el: ElementRef) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_ad(el: ElementRef) -> bool {
    el.value().classes().any(|c| c == "result--ad")
}

/// Resolve a result href to the target URL.
/// DuckDuckGo wraps targets in `//duckduckgo.com/l/?uddg=<encoded>` redirects.
pub fn resolve_link(href: &str) -> Option<String> {
    let href = href.trim();
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("https://duckduckgo.com{}", href)
    } else {
        href.to_string()
    };

    let parsed = url::Url::parse(&absolute).ok()?;

    if parsed.path().starts_with("/l/") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "uddg")
            .map(|(_, v)| v.into_owned())
            .filter(|v| v.starts_with("http://") || v.starts_with("https://"));
    }

    match parsed.scheme() {
        "http" | "https" => Some(parsed.to_string()),
        _ => None,
    }
}

/// Parse a DuckDuckGo HTML results page, skipping ads and unresolvable links.
pub fn parse_results(html: &str, max_results: usize) -> Vec<SearchResult> {
    let doc = Html::parse_document(html);
    let sel = selectors();
    let mut results = Vec::new();

    for block in doc.select(&sel.result) {
        if results.len() >= max_results {
            break;
        }
        if is_ad(block) {
            continue;
        }

        let Some(anchor) = block.select(&sel.title).next() else {
            continue;
        };
        let Some(link) = anchor.value().attr("href").and_then(resolve_link) else {
            continue;
        };

        let snippet = block
            .select(&sel.snippet)
            .next()
            .map(collapsed_text)
            .unwrap_or_default();

        results.push(SearchResult {
            title: collapsed_text(anchor),
            link,
            snippet,
        });
    }

    results
}
