// Shared application state passed to all route handlers

use crate::services::collaborators::{CollaboratorError, CollaboratorFactory};
use crate::services::config_store::AppConfig;
use crate::services::detection::{AiDetector, SimilarityChecker, SimilaritySettings};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

pub struct AppState {
    pub config: AppConfig,
    collaborators: Arc<dyn CollaboratorFactory>,
    /// Built on first use; a failed build is retried by the next request
    detector: OnceCell<AiDetector>,
    similarity: OnceCell<SimilarityChecker>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: AppConfig, collaborators: Arc<dyn CollaboratorFactory>) -> Self {
        Self {
            config,
            collaborators,
            detector: OnceCell::new(),
            similarity: OnceCell::new(),
            startup_time: chrono::Utc::now(),
        }
    }

    pub async fn detector(&self) -> Result<&AiDetector, CollaboratorError> {
        self.detector
            .get_or_try_init(|| async {
                let language_model = self.collaborators.language_model()?;
                info!("[API] language model handle initialized");
                Ok(AiDetector::new(language_model, self.config.detection.min_words))
            })
            .await
    }

    pub async fn similarity_checker(&self) -> Result<&SimilarityChecker, CollaboratorError> {
        self.similarity
            .get_or_try_init(|| async {
                let embedder = self.collaborators.embedder()?;
                let search = self.collaborators.web_search()?;
                let fetcher = self.collaborators.page_fetcher()?;
                info!("[API] embedding, search and fetch handles initialized");
                Ok(SimilarityChecker::new(
                    search,
                    fetcher,
                    embedder,
                    SimilaritySettings::from_config(&self.config.search, &self.config.fetch),
                ))
            })
            .await
    }
}
