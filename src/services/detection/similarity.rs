// Similarity Checker
// Web search + page scraping + embedding similarity against the submitted text

use crate::models::{SearchResult, SimilarityMatch, SimilarityReport};
use crate::services::config_store::{FetchConfig, SearchConfig};
use crate::services::page_fetcher::{FetchError, PageFetcher};
use crate::services::providers::{Embedder, ProviderError};
use crate::services::search::WebSearch;
use crate::services::text_processor::{clean_text, leading_words, round_to};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] ProviderError),
}

#[derive(Debug, Clone)]
pub struct SimilaritySettings {
    pub max_results: usize,
    pub query_words: usize,
    pub fetch_timeout: Duration,
    pub max_concurrency: usize,
}

impl Default for SimilaritySettings {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default(), &FetchConfig::default())
    }
}

impl SimilaritySettings {
    pub fn from_config(search: &SearchConfig, fetch: &FetchConfig) -> Self {
        Self {
            max_results: search.max_results,
            query_words: search.query_words,
            fetch_timeout: Duration::from_secs(fetch.timeout_secs),
            max_concurrency: fetch.max_concurrency.max(1),
        }
    }
}

/// Cosine similarity of two vectors; 0 for mismatched or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Cosine similarity scaled to 0-100 with 2 decimal places
pub fn similarity_percent(a: &[f32], b: &[f32]) -> f64 {
    round_to((cosine_similarity(a, b) * 100.0).clamp(0.0, 100.0), 2)
}

async fn embed_one(embedder: &dyn Embedder, text: String) -> Result<Vec<f32>, ProviderError> {
    embedder
        .embed(&[text])
        .await?
        .into_iter()
        .next()
        .ok_or(ProviderError::MissingContent)
}

pub struct SimilarityChecker {
    search: Arc<dyn WebSearch>,
    fetcher: Arc<dyn PageFetcher>,
    embedder: Arc<dyn Embedder>,
    settings: SimilaritySettings,
}

impl SimilarityChecker {
    pub fn new(
        search: Arc<dyn WebSearch>,
        fetcher: Arc<dyn PageFetcher>,
        embedder: Arc<dyn Embedder>,
        settings: SimilaritySettings,
    ) -> Self {
        Self {
            search,
            fetcher,
            embedder,
            settings,
        }
    }

    /// Search the web for the opening of `text` and score every fetchable
    /// result page. Pages that fail to fetch are left out; a page whose
    /// embedding fails is kept with a score of 0.
    pub async fn check(&self, text: &str) -> Result<SimilarityReport, SimilarityError> {
        let started = Instant::now();
        let query = leading_words(text, self.settings.query_words);
        if query.is_empty() {
            return Ok(SimilarityReport::default());
        }

        let results = match self.search.search(&query, self.settings.max_results).await {
            Ok(results) => results,
            Err(e) => {
                warn!("[SIMILARITY] search failed, treating as no results: {}", e);
                Vec::new()
            }
        };
        if results.is_empty() {
            info!("[SIMILARITY] search returned no results");
            return Ok(SimilarityReport::default());
        }
        let search_results = results.len();

        let reference = Arc::new(embed_one(self.embedder.as_ref(), clean_text(text)).await?);
        let matches = self.score_results(results, reference).await;

        let mut max_similarity = 0.0;
        let mut top_link = None;
        for m in &matches {
            if m.similarity_score > max_similarity {
                max_similarity = m.similarity_score;
                top_link = Some(m.link.clone());
            }
        }

        info!(
            "[SIMILARITY] results={} matches={} max_similarity={} elapsed_ms={}",
            search_results,
            matches.len(),
            max_similarity,
            started.elapsed().as_millis()
        );

        Ok(SimilarityReport {
            max_similarity,
            top_link,
            matches,
            search_results,
        })
    }

    /// Fetch and score result pages with bounded concurrency, keeping search rank order
    async fn score_results(
        &self,
        results: Vec<SearchResult>,
        reference: Arc<Vec<f32>>,
    ) -> Vec<SimilarityMatch> {
        let semaphore = Arc::new(Semaphore::new(self.settings.max_concurrency));
        let mut join_set: JoinSet<(usize, Option<SimilarityMatch>)> = JoinSet::new();

        for (rank, result) in results.into_iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let embedder = self.embedder.clone();
            let semaphore = semaphore.clone();
            let reference = reference.clone();
            let timeout = self.settings.fetch_timeout;

            join_set.spawn(async move {
                let scored = {
                    let Ok(_permit) = semaphore.acquire().await else {
                        return (rank, None);
                    };
                    score_page(fetcher.as_ref(), embedder.as_ref(), &result, &reference, timeout).await
                };

                match scored {
                    Ok(score) => (
                        rank,
                        Some(SimilarityMatch {
                            title: result.title,
                            link: result.link,
                            snippet: result.snippet,
                            similarity_score: score,
                        }),
                    ),
                    Err(e) => {
                        warn!("[SIMILARITY] skipping {}: {}", result.link, e);
                        (rank, None)
                    }
                }
            });
        }

        let mut scored: Vec<(usize, SimilarityMatch)> = Vec::new();
        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((rank, Some(m))) => scored.push((rank, m)),
                Ok((_, None)) => {}
                Err(e) => warn!("[SIMILARITY] page task failed: {}", e),
            }
        }

        scored.sort_by_key(|(rank, _)| *rank);
        scored.into_iter().map(|(_, m)| m).collect()
    }
}

async fn score_page(
    fetcher: &dyn PageFetcher,
    embedder: &dyn Embedder,
    result: &SearchResult,
    reference: &[f32],
    timeout: Duration,
) -> Result<f64, FetchError> {
    let content = tokio::time::timeout(timeout, fetcher.fetch_text(&result.link))
        .await
        .map_err(|_| FetchError::Timeout(timeout.as_secs()))??;

    let page = clean_text(&content);
    if page.is_empty() {
        return Err(FetchError::EmptyContent);
    }

    match embed_one(embedder, page).await {
        Ok(embedding) => Ok(similarity_percent(reference, &embedding)),
        Err(e) => {
            warn!("[SIMILARITY] embedding failed for {}, scoring 0: {}", result.link, e);
            Ok(0.0)
        }
    }
}
