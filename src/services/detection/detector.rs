// AI Content Detector
// Collects perplexity, burstiness and stylometry signals and scores them

use crate::models::{AiDetection, AiDetectionResult, InsufficientInput, SignalScores};
use crate::services::providers::{LanguageModel, ProviderError};
use crate::services::text_processor::{
    analyze_statistical_features, calculate_burstiness, round_to, word_count,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::scoring::{score_signals, verdict_for};

pub const DEFAULT_MIN_WORDS: usize = 50;

pub struct AiDetector {
    language_model: Arc<dyn LanguageModel>,
    min_words: usize,
}

impl AiDetector {
    pub fn new(language_model: Arc<dyn LanguageModel>, min_words: usize) -> Self {
        Self {
            language_model,
            min_words,
        }
    }

    /// Perplexity = exp(mean token log-loss). Lower means more predictable text.
    pub async fn calculate_perplexity(&self, text: &str) -> Result<f64, ProviderError> {
        let loss = self.language_model.log_loss(text).await?;
        let perplexity = loss.exp();
        if !perplexity.is_finite() {
            return Err(ProviderError::InvalidLoss(loss));
        }
        Ok(perplexity)
    }

    /// Score `text`. Texts shorter than the minimum word count get an
    /// explanatory payload instead of a score.
    pub async fn detect(&self, text: &str, detailed: bool) -> AiDetection {
        let words = word_count(text);
        if words < self.min_words {
            info!("[DETECTOR] text too short: words={} min={}", words, self.min_words);
            return insufficient_input(self.min_words);
        }

        let start = Instant::now();
        let perplexity = match self.calculate_perplexity(text).await {
            Ok(ppl) => Some(ppl),
            Err(e) => {
                warn!("[DETECTOR] perplexity unavailable, excluding signal: {}", e);
                None
            }
        };

        let detection = score_text(text, perplexity, detailed);
        if let AiDetection::Scored(ref result) = detection {
            info!(
                "[DETECTOR] words={} ai_probability={} verdict={} elapsed_ms={}",
                words,
                result.ai_probability,
                result.verdict.as_str(),
                start.elapsed().as_millis()
            );
        }
        detection
    }
}

pub fn insufficient_input(min_words: usize) -> AiDetection {
    AiDetection::Insufficient(InsufficientInput {
        error: format!(
            "Text too short for reliable detection (minimum {} words)",
            min_words
        ),
        ai_probability: None,
    })
}

/// Gather the text-derived signals around an externally computed perplexity
pub fn collect_signals(text: &str, perplexity: Option<f64>) -> SignalScores {
    SignalScores {
        perplexity,
        burstiness: calculate_burstiness(text),
        statistical_features: analyze_statistical_features(text).unwrap_or_default(),
    }
}

/// Deterministic scoring of `text` given its perplexity (if any)
pub fn score_text(text: &str, perplexity: Option<f64>, detailed: bool) -> AiDetection {
    let signals = collect_signals(text, perplexity);
    let card = score_signals(&signals);
    let (verdict, confidence) = verdict_for(card.total);

    let mut result = AiDetectionResult {
        ai_probability: round_to(card.total, 2),
        verdict,
        confidence,
        perplexity: signals.perplexity.map(|p| round_to(p, 2)),
        burstiness: round_to(signals.burstiness, 3),
        statistical_features: None,
        confidence_factors: None,
        score_breakdown: None,
    };

    if detailed {
        result.statistical_features = Some(signals.statistical_features);
        result.confidence_factors = Some(card.factors);
        result.score_breakdown = Some(card.breakdown);
    }

    AiDetection::Scored(result)
}
