// Collaborator Factory
// Builds the external model, search and fetch handles from configuration

use crate::services::config_store::AppConfig;
use crate::services::page_fetcher::{FetchError, HttpPageFetcher, PageFetcher};
use crate::services::providers::{Embedder, LanguageModel, ProviderClient, ProviderError};
use crate::services::search::{DuckDuckGoSearch, SearchError, WebSearch};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("Model provider unavailable: {0}")]
    Provider(#[from] ProviderError),
    #[error("Search provider unavailable: {0}")]
    Search(#[from] SearchError),
    #[error("Page fetcher unavailable: {0}")]
    Fetch(#[from] FetchError),
}

/// Source of the external collaborators. Handles are built on first use and
/// then shared for the lifetime of the process.
pub trait CollaboratorFactory: Send + Sync {
    fn language_model(&self) -> Result<Arc<dyn LanguageModel>, CollaboratorError>;
    fn embedder(&self) -> Result<Arc<dyn Embedder>, CollaboratorError>;
    fn web_search(&self) -> Result<Arc<dyn WebSearch>, CollaboratorError>;
    fn page_fetcher(&self) -> Result<Arc<dyn PageFetcher>, CollaboratorError>;
}

/// HTTP-backed collaborators configured from [`AppConfig`]
pub struct HttpCollaborators {
    config: AppConfig,
}

impl HttpCollaborators {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl CollaboratorFactory for HttpCollaborators {
    fn language_model(&self) -> Result<Arc<dyn LanguageModel>, CollaboratorError> {
        Ok(Arc::new(ProviderClient::from_config(&self.config.models)?))
    }

    fn embedder(&self) -> Result<Arc<dyn Embedder>, CollaboratorError> {
        Ok(Arc::new(ProviderClient::from_config(&self.config.models)?))
    }

    fn web_search(&self) -> Result<Arc<dyn WebSearch>, CollaboratorError> {
        Ok(Arc::new(DuckDuckGoSearch::from_config(
            &self.config.search,
            &self.config.fetch.user_agent,
        )?))
    }

    fn page_fetcher(&self) -> Result<Arc<dyn PageFetcher>, CollaboratorError> {
        Ok(Arc::new(HttpPageFetcher::from_config(&self.config.fetch)?))
    }
}
