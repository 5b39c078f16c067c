// Combined Check
// Runs AI detection and web similarity together and merges them into one verdict

use crate::models::{CombinedCheckResponse, OverallVerdict, PlagiarismDetection, SimilarityReport};
use tracing::{info, warn};

use super::detector::AiDetector;
use super::similarity::SimilarityChecker;

const PLAGIARISM_THRESHOLD: f64 = 70.0;
const AI_THRESHOLD: f64 = 50.0;

/// Overall verdict from the best web match and the AI probability.
/// A missing AI probability (short text) counts as not AI.
pub fn combine_verdicts(max_similarity: f64, ai_probability: Option<f64>) -> OverallVerdict {
    let plagiarized = max_similarity > PLAGIARISM_THRESHOLD;
    let ai = ai_probability.map_or(false, |p| p > AI_THRESHOLD);

    match (plagiarized, ai) {
        (true, true) => OverallVerdict::AiGeneratedAndPlagiarized,
        (true, false) => OverallVerdict::Plagiarized,
        (false, true) => OverallVerdict::AiGeneratedOriginal,
        (false, false) => OverallVerdict::OriginalHumanWriting,
    }
}

/// Run both flows concurrently. A failed similarity flow degrades to an
/// empty plagiarism report rather than failing the whole check.
pub async fn combined_check(
    detector: &AiDetector,
    checker: &SimilarityChecker,
    text: &str,
) -> CombinedCheckResponse {
    let (ai_detection, similarity) = tokio::join!(detector.detect(text, true), checker.check(text));

    let report = similarity.unwrap_or_else(|e| {
        warn!("[COMBINED] similarity flow failed, reporting no matches: {}", e);
        SimilarityReport::default()
    });

    let overall_verdict = combine_verdicts(report.max_similarity, ai_detection.ai_probability());
    info!(
        "[COMBINED] max_similarity={} ai_probability={:?} verdict={:?}",
        report.max_similarity,
        ai_detection.ai_probability(),
        overall_verdict
    );

    CombinedCheckResponse {
        overall_verdict,
        ai_detection,
        plagiarism_detection: PlagiarismDetection::from(report),
    }
}
