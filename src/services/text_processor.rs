// Text Processing Service
// Word/sentence splitting and the stylometric signals built on them

use crate::models::StatisticalFeatures;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn sentence_boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("sentence boundary regex"))
}

/// Whitespace-separated words
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Simple sentence splitting on runs of `.`, `!` and `?`.
/// Pieces are trimmed and empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return vec![];
    }

    sentence_boundary_re()
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

fn sentence_word_counts(sentences: &[&str]) -> Vec<f64> {
    sentences.iter().map(|s| word_count(s) as f64).collect()
}

/// First `limit` words joined by single spaces (used as the search query)
pub fn leading_words(text: &str, limit: usize) -> String {
    text.split_whitespace().take(limit).collect::<Vec<_>>().join(" ")
}

/// Normalize text before embedding
pub fn clean_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance
fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Sentence-length variation normalized by the mean sentence length.
/// Uniform (machine-like) sentence construction gives values near 0.
pub fn calculate_burstiness(text: &str) -> f64 {
    let sentences = split_sentences(text);
    if sentences.len() < 3 {
        return 0.0;
    }

    let lengths = sentence_word_counts(&sentences);
    std_dev(&lengths) / mean(&lengths).max(1.0)
}

/// Compute stylometry features for text.
/// Returns `None` when the text has no words or no sentences.
pub fn analyze_statistical_features(text: &str) -> Option<StatisticalFeatures> {
    let words = split_words(text);
    let sentences = split_sentences(text);

    if words.is_empty() || sentences.is_empty() {
        return None;
    }

    let total_words = words.len();
    let total_sentences = sentences.len();

    let avg_sentence_length = total_words as f64 / total_sentences as f64;

    // Word length in chars (not UTF-8 bytes)
    let word_lengths: Vec<f64> = words.iter().map(|w| w.chars().count() as f64).collect();
    let avg_word_length = mean(&word_lengths);

    // Type-Token Ratio
    let unique_words: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();
    let ttr = unique_words.len() as f64 / total_words as f64;

    let sentence_variance = variance(&sentence_word_counts(&sentences));

    Some(StatisticalFeatures {
        avg_sentence_length: round_to(avg_sentence_length, 2),
        avg_word_length: round_to(avg_word_length, 2),
        vocabulary_diversity: round_to(ttr, 3),
        sentence_variance: round_to(sentence_variance, 2),
        total_sentences,
        total_words,
    })
}
