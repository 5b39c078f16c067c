// Veritext Core Services

pub mod text_processor;
pub mod pdf_text;
pub mod config_store;
pub mod providers;
pub mod search;
pub mod page_fetcher;
pub mod collaborators;
pub mod detection;

#[cfg(test)]
pub mod testing;

pub use text_processor::*;
pub use pdf_text::{clean_pdf_text, extract_pdf, ExtractedPdf, PdfError};
pub use config_store::*;
pub use providers::*;
pub use search::{DuckDuckGoSearch, SearchError, WebSearch};
pub use page_fetcher::{extract_main_text, FetchError, HttpPageFetcher, PageFetcher};
pub use collaborators::{CollaboratorError, CollaboratorFactory, HttpCollaborators};

// Re-export detection module functions
pub use detection::{
    combine_verdicts,
    combined_check,
    score_text,
    AiDetector,
    SimilarityChecker,
    SimilarityError,
    SimilaritySettings,
};
