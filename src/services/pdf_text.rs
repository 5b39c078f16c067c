// PDF Text Service
// Extracts per-page text from PDF bytes and reflows it into paragraphs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Error processing PDF: {0}")]
    Extraction(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedPdf {
    pub text: String,
    pub page_count: usize,
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n+").expect("blank lines regex"))
}

fn hyphen_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\s*\n\s*").expect("hyphen break regex"))
}

fn space_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" +").expect("space run regex"))
}

fn ends_paragraph(line: &str) -> bool {
    matches!(line.chars().last(), Some('.' | '!' | '?' | ':'))
}

/// Clean up PDF text layout: collapse blank lines, rejoin hyphenated words,
/// squeeze spaces and reflow wrapped lines into paragraphs.
///
/// A paragraph accumulates lines until one ends in `.`, `!`, `?` or `:`,
/// or until a blank line. Paragraphs are separated by a blank line.
pub fn clean_pdf_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let text = blank_lines_re().replace_all(text, "\n\n");
    let text = hyphen_break_re().replace_all(&text, "");
    let text = space_run_re().replace_all(&text, " ");

    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let line = line.trim();

        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(line);

        if ends_paragraph(line) {
            paragraphs.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs.join("\n\n").trim().to_string()
}

/// Extract and normalize the text layer of a PDF held in memory.
/// Scanned pages without a text layer contribute nothing.
pub fn extract_pdf(bytes: &[u8]) -> Result<ExtractedPdf, PdfError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| PdfError::Extraction(e.to_string()))?;

    let mut raw = String::new();
    for page in &pages {
        if !page.is_empty() {
            raw.push_str(page);
            raw.push_str("\n\n");
        }
    }

    Ok(ExtractedPdf {
        text: clean_pdf_text(&raw),
        page_count: pages.len(),
    })
}
