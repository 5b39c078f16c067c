// Veritext Data Models
// Request/response payloads and detection signal types

use serde::{Deserialize, Serialize};

// ============ Requests ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TextRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub detailed: bool,
}

// ============ Signal Types ============

/// Stylometric features of a text, rounded the way they are reported.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct StatisticalFeatures {
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    /// Type-Token Ratio over lowercased words
    pub vocabulary_diversity: f64,
    pub sentence_variance: f64,
    pub total_sentences: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct SignalScores {
    /// `None` when the language model could not score the text.
    pub perplexity: Option<f64>,
    pub burstiness: f64,
    pub statistical_features: StatisticalFeatures,
}

// ============ AI Detection ============

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Verdict {
    #[serde(rename = "Likely AI-Generated")]
    LikelyAiGenerated,
    #[serde(rename = "Possibly AI-Generated")]
    PossiblyAiGenerated,
    #[serde(rename = "Possibly Human-Written")]
    PossiblyHumanWritten,
    #[serde(rename = "Likely Human-Written")]
    LikelyHumanWritten,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LikelyAiGenerated => "Likely AI-Generated",
            Self::PossiblyAiGenerated => "Possibly AI-Generated",
            Self::PossiblyHumanWritten => "Possibly Human-Written",
            Self::LikelyHumanWritten => "Likely Human-Written",
        }
    }
}

/// Verdict confidence. Only the two extremes of the score range are `High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Confidence {
    Medium,
    High,
}

/// Points each signal contributed to `ai_probability`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub perplexity: f64,
    pub burstiness: f64,
    pub features: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiDetectionResult {
    pub ai_probability: f64,
    pub verdict: Verdict,
    pub confidence: Confidence,
    pub perplexity: Option<f64>,
    pub burstiness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistical_features: Option<StatisticalFeatures>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_breakdown: Option<ScoreBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsufficientInput {
    pub error: String,
    /// Always `None`; kept so clients can test `ai_probability` uniformly.
    pub ai_probability: Option<f64>,
}

/// Outcome of AI detection: a scored result, or an explanatory payload when
/// the text is too short to score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AiDetection {
    Scored(AiDetectionResult),
    Insufficient(InsufficientInput),
}

impl AiDetection {
    pub fn ai_probability(&self) -> Option<f64> {
        match self {
            Self::Scored(result) => Some(result.ai_probability),
            Self::Insufficient(payload) => payload.ai_probability,
        }
    }
}

// ============ Search & Similarity ============

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimilarityMatch {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SimilarityReport {
    pub max_similarity: f64,
    pub top_link: Option<String>,
    pub matches: Vec<SimilarityMatch>,
    /// Number of results the search returned, before any fetch failures.
    pub search_results: usize,
}

// ============ Responses ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResponse {
    pub max_similarity_score: f64,
    pub top_link: Option<String>,
    pub all_results: Vec<SimilarityMatch>,
}

impl From<SimilarityReport> for SimilarityResponse {
    fn from(report: SimilarityReport) -> Self {
        Self {
            max_similarity_score: report.max_similarity,
            top_link: report.top_link,
            all_results: report.matches,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismMatch {
    pub title: String,
    pub link: String,
    pub similarity_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlagiarismDetection {
    pub max_similarity: f64,
    pub top_match: Option<String>,
    pub all_matches: Vec<PlagiarismMatch>,
}

impl From<SimilarityReport> for PlagiarismDetection {
    fn from(report: SimilarityReport) -> Self {
        Self {
            max_similarity: report.max_similarity,
            top_match: report.top_link,
            all_matches: report
                .matches
                .into_iter()
                .map(|m| PlagiarismMatch {
                    title: m.title,
                    link: m.link,
                    similarity_score: m.similarity_score,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OverallVerdict {
    #[serde(rename = "AI-Generated and Plagiarized")]
    AiGeneratedAndPlagiarized,
    #[serde(rename = "Plagiarized")]
    Plagiarized,
    #[serde(rename = "AI-Generated (Original)")]
    AiGeneratedOriginal,
    #[serde(rename = "Original Human Writing")]
    OriginalHumanWriting,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedCheckResponse {
    pub overall_verdict: OverallVerdict,
    pub ai_detection: AiDetection,
    pub plagiarism_detection: PlagiarismDetection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfUploadResponse {
    pub text: String,
    pub page_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
}
