// Scoring Rubric
// Fixed threshold tables that turn signals into an additive 0-100 score.
// The weights are heuristic constants and are kept exactly as calibrated.

use crate::models::{Confidence, ScoreBreakdown, SignalScores, Verdict};

/// (upper bound exclusive, points, factor). First matching band wins.
type Band = (f64, f64, &'static str);

const PERPLEXITY_BANDS: [Band; 3] = [
    (30.0, 40.0, "Very low perplexity (highly predictable)"),
    (50.0, 30.0, "Low perplexity (somewhat predictable)"),
    (100.0, 15.0, "Moderate perplexity"),
];
const PERPLEXITY_FLOOR_FACTOR: &str = "High perplexity (varied language)";
const PERPLEXITY_ABSENT_FACTOR: &str = "Perplexity unavailable (excluded from score)";

const BURSTINESS_BANDS: [Band; 3] = [
    (0.3, 30.0, "Very uniform sentence lengths"),
    (0.5, 20.0, "Somewhat uniform sentences"),
    (0.7, 10.0, "Moderate sentence variation"),
];
const BURSTINESS_FLOOR_FACTOR: &str = "High sentence variation (human-like)";

const FEATURE_POINTS: f64 = 10.0;
const SENTENCE_LENGTH_RANGE: (f64, f64) = (15.0, 25.0);
const SENTENCE_VARIANCE_MAX: f64 = 30.0;
const VOCABULARY_DIVERSITY_MIN: f64 = 0.7;

/// (minimum score, verdict, confidence), checked top-down
const VERDICT_TABLE: [(f64, Verdict, Confidence); 3] = [
    (70.0, Verdict::LikelyAiGenerated, Confidence::High),
    (50.0, Verdict::PossiblyAiGenerated, Confidence::Medium),
    (30.0, Verdict::PossiblyHumanWritten, Confidence::Medium),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    /// Human-readable reasons, in rule order
    pub factors: Vec<String>,
}

fn band_points(value: f64, bands: &[Band], floor_factor: &'static str) -> (f64, &'static str) {
    bands
        .iter()
        .find(|(upper, _, _)| value < *upper)
        .map(|(_, points, factor)| (*points, *factor))
        .unwrap_or((0.0, floor_factor))
}

pub fn score_perplexity(perplexity: Option<f64>) -> (f64, &'static str) {
    match perplexity {
        Some(ppl) => band_points(ppl, &PERPLEXITY_BANDS, PERPLEXITY_FLOOR_FACTOR),
        None => (0.0, PERPLEXITY_ABSENT_FACTOR),
    }
}

pub fn score_burstiness(burstiness: f64) -> (f64, &'static str) {
    band_points(burstiness, &BURSTINESS_BANDS, BURSTINESS_FLOOR_FACTOR)
}

/// Apply the full rubric to a set of signals
pub fn score_signals(signals: &SignalScores) -> ScoreCard {
    let mut factors = Vec::new();

    let (perplexity_points, factor) = score_perplexity(signals.perplexity);
    factors.push(factor.to_string());

    let (burstiness_points, factor) = score_burstiness(signals.burstiness);
    factors.push(factor.to_string());

    let features = &signals.statistical_features;
    let mut feature_points = 0.0;

    // Zeroed features mean the text had no countable sentences
    if features.total_words > 0 && features.total_sentences > 0 {
        let (min_len, max_len) = SENTENCE_LENGTH_RANGE;
        if (min_len..=max_len).contains(&features.avg_sentence_length) {
            feature_points += FEATURE_POINTS;
            factors.push("Optimal sentence length consistency".to_string());
        }
        if features.sentence_variance < SENTENCE_VARIANCE_MAX {
            feature_points += FEATURE_POINTS;
            factors.push("Low sentence length variance".to_string());
        }
        if features.vocabulary_diversity > VOCABULARY_DIVERSITY_MIN {
            feature_points += FEATURE_POINTS;
            factors.push("Very high vocabulary diversity".to_string());
        }
    }

    let total = perplexity_points + burstiness_points + feature_points;

    ScoreCard {
        total: total.clamp(0.0, 100.0),
        breakdown: ScoreBreakdown {
            perplexity: perplexity_points,
            burstiness: burstiness_points,
            features: feature_points,
        },
        factors,
    }
}

/// Map a 0-100 score to its verdict and confidence
pub fn verdict_for(score: f64) -> (Verdict, Confidence) {
    VERDICT_TABLE
        .iter()
        .find(|(min, _, _)| score >= *min)
        .map(|(_, verdict, confidence)| (*verdict, *confidence))
        .unwrap_or((Verdict::LikelyHumanWritten, Confidence::High))
}
