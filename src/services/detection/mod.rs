// Detection Module
// - scoring: fixed rubric turning signals into a 0-100 score and verdict
// - detector: perplexity + burstiness + stylometry AI detection
// - similarity: web search and embedding similarity
// - combined: merges both into an overall verdict

pub mod scoring;
pub mod detector;
pub mod similarity;
pub mod combined;

pub use scoring::{score_signals, verdict_for, ScoreCard};
pub use detector::{collect_signals, insufficient_input, score_text, AiDetector, DEFAULT_MIN_WORDS};
pub use similarity::{
    cosine_similarity,
    similarity_percent,
    SimilarityChecker,
    SimilarityError,
    SimilaritySettings,
};
pub use combined::{combine_verdicts, combined_check};
