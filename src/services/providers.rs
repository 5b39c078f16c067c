// Model Provider Service
// HTTP clients for the language-model scorer and the sentence-embedding model

use crate::services::config_store::ModelsConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Missing content in response")]
    MissingContent,
    #[error("JSON parse error: {0}")]
    JsonError(String),
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },
    #[error("Language model returned a non-finite loss: {0}")]
    InvalidLoss(f64),
}

/// Causal language model that scores text by mean token log-loss.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn log_loss(&self, text: &str) -> Result<f64, ProviderError>;
}

/// Sentence-embedding model; returns one vector per input, in input order.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

#[derive(Debug, Clone, Serialize)]
struct LossRequest<'a> {
    model: &'a str,
    text: &'a str,
    max_tokens: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct LossResponse {
    loss: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    data: Option<Vec<EmbeddingData>>,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

fn validate_endpoint(url: &str) -> Result<String, ProviderError> {
    let parsed = url::Url::parse(url).map_err(|e| ProviderError::InvalidEndpoint {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ProviderError::InvalidEndpoint {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

pub struct ProviderClient {
    client: Client,
    lm_url: String,
    lm_model: String,
    max_tokens: usize,
    embedding_url: String,
    embedding_model: String,
    api_key: Option<String>,
}

impl ProviderClient {
    pub fn from_config(config: &ModelsConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            lm_url: validate_endpoint(&config.lm_url)?,
            lm_model: config.lm_model.clone(),
            max_tokens: config.max_tokens,
            embedding_url: validate_endpoint(&config.embedding_url)?,
            embedding_model: config.embedding_model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .post(url)
            .header("Content-Type", "application/json");
        match &self.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl LanguageModel for ProviderClient {
    async fn log_loss(&self, text: &str) -> Result<f64, ProviderError> {
        let request = LossRequest {
            model: &self.lm_model,
            text,
            max_tokens: self.max_tokens,
        };

        let start = Instant::now();
        let response = self.post(&self.lm_url).json(&request).send().await?;
        let response = Self::check_status(response).await?;

        let data: LossResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        debug!(
            "[PROVIDER] loss model={} latency_ms={}",
            self.lm_model,
            start.elapsed().as_millis()
        );
        data.loss.ok_or(ProviderError::MissingContent)
    }
}

#[async_trait]
impl Embedder for ProviderClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if inputs.is_empty() {
            return Ok(vec![]);
        }

        let request = EmbeddingRequest {
            model: &self.embedding_model,
            input: inputs,
        };

        let start = Instant::now();
        let response = self.post(&self.embedding_url).json(&request).send().await?;
        let response = Self::check_status(response).await?;

        let data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::JsonError(e.to_string()))?;

        let mut items = data.data.ok_or(ProviderError::MissingContent)?;
        if items.len() != inputs.len() {
            return Err(ProviderError::JsonError(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                items.len()
            )));
        }
        items.sort_by_key(|d| d.index);

        debug!(
            "[PROVIDER] embeddings model={} count={} latency_ms={}",
            self.embedding_model,
            items.len(),
            start.elapsed().as_millis()
        );
        Ok(items.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_client_creation() {
        let config = ModelsConfig::default();
        let client = ProviderClient::from_config(&config).unwrap();
        assert!(client.lm_url.starts_with("http://127.0.0.1"));
        assert_eq!(client.embedding_model, "all-MiniLM-L6-v2");
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = ModelsConfig {
            lm_url: "not a url".to_string(),
            ..ModelsConfig::default()
        };
        let err = ProviderClient::from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_unsupported_scheme_rejected() {
        let config = ModelsConfig {
            embedding_url: "ftp://models.local/embed".to_string(),
            ..ModelsConfig::default()
        };
        assert!(ProviderClient::from_config(&config).is_err());
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let config = ModelsConfig {
            api_key: Some("   ".to_string()),
            ..ModelsConfig::default()
        };
        let client = ProviderClient::from_config(&config).unwrap();
        assert!(client.api_key.is_none());
    }

    #[test]
    fn test_embedding_response_parsing() {
        let body = r#"{"data":[{"index":1,"embedding":[0.5,0.5]},{"index":0,"embedding":[1.0,0.0]}]}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        let mut items = parsed.data.unwrap();
        items.sort_by_key(|d| d.index);
        assert_eq!(items[0].embedding, vec![1.0, 0.0]);
    }
}
