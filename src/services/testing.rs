// In-memory collaborators for unit and router tests

use crate::models::SearchResult;
use crate::services::collaborators::{CollaboratorError, CollaboratorFactory};
use crate::services::page_fetcher::{FetchError, PageFetcher};
use crate::services::providers::{Embedder, LanguageModel, ProviderError};
use crate::services::search::{SearchError, WebSearch};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn result(link: &str) -> SearchResult {
    SearchResult {
        title: format!("Title for {}", link),
        link: link.to_string(),
        snippet: format!("Snippet for {}", link),
    }
}

/// Language model that always reports the same mean loss
pub struct FixedLossModel(pub f64);

#[async_trait]
impl LanguageModel for FixedLossModel {
    async fn log_loss(&self, _text: &str) -> Result<f64, ProviderError> {
        Ok(self.0)
    }
}

pub struct FailingLanguageModel;

#[async_trait]
impl LanguageModel for FailingLanguageModel {
    async fn log_loss(&self, _text: &str) -> Result<f64, ProviderError> {
        Err(ProviderError::ApiError {
            status: 503,
            message: "model offline".to_string(),
        })
    }
}

/// Embeds text as its a-z letter counts. Identical texts score 100.
pub struct LetterEmbedder;

#[async_trait]
impl Embedder for LetterEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Ok(inputs
            .iter()
            .map(|text| {
                let mut counts = vec![0f32; 26];
                for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
                    counts[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
                }
                counts
            })
            .collect())
    }
}

/// Letter-count embedder that fails any batch containing `self.0`
pub struct MarkerFailingEmbedder(pub &'static str);

#[async_trait]
impl Embedder for MarkerFailingEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.iter().any(|text| text.contains(self.0)) {
            return Err(ProviderError::ApiError {
                status: 500,
                message: "embedding backend error".to_string(),
            });
        }
        LetterEmbedder.embed(inputs).await
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        Err(ProviderError::MissingContent)
    }
}

pub struct FakeSearch {
    results: Option<Vec<SearchResult>>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeSearch {
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results: Some(results),
            queries: Arc::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            results: None,
            queries: Arc::default(),
        }
    }

    /// Every query received so far
    pub fn queries(&self) -> Arc<Mutex<Vec<String>>> {
        self.queries.clone()
    }
}

#[async_trait]
impl WebSearch for FakeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        match &self.results {
            Some(results) => Ok(results.iter().take(max_results).cloned().collect()),
            None => Err(SearchError::ApiError {
                status: 503,
                message: "search offline".to_string(),
            }),
        }
    }
}

/// Serves canned page text by URL; unknown URLs answer 404
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
}

impl FakeFetcher {
    pub fn page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        if self.failing.contains(url) {
            return Err(FetchError::Status(500));
        }
        self.pages.get(url).cloned().ok_or(FetchError::Status(404))
    }
}

/// Factory handing out pre-built fakes and counting how often each is built
pub struct FakeCollaborators {
    pub language_model: Arc<dyn LanguageModel>,
    pub embedder: Arc<dyn Embedder>,
    pub search: Arc<dyn WebSearch>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub embedder_unavailable: bool,
    pub builds: AtomicUsize,
}

impl FakeCollaborators {
    pub fn new(search: FakeSearch, fetcher: FakeFetcher) -> Self {
        Self {
            language_model: Arc::new(FixedLossModel(2.0)),
            embedder: Arc::new(LetterEmbedder),
            search: Arc::new(search),
            fetcher: Arc::new(fetcher),
            embedder_unavailable: false,
            builds: AtomicUsize::new(0),
        }
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }
}

impl CollaboratorFactory for FakeCollaborators {
    fn language_model(&self) -> Result<Arc<dyn LanguageModel>, CollaboratorError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.language_model.clone())
    }

    fn embedder(&self) -> Result<Arc<dyn Embedder>, CollaboratorError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.embedder_unavailable {
            return Err(ProviderError::InvalidEndpoint {
                url: "embedder".to_string(),
                reason: "unavailable".to_string(),
            }
            .into());
        }
        Ok(self.embedder.clone())
    }

    fn web_search(&self) -> Result<Arc<dyn WebSearch>, CollaboratorError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.search.clone())
    }

    fn page_fetcher(&self) -> Result<Arc<dyn PageFetcher>, CollaboratorError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(self.fetcher.clone())
    }
}
