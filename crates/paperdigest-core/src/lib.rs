use std::path::PathBuf;

use thiserror::Error;

pub mod backend;
pub mod chunk;
pub mod clean;
pub mod config_file;
pub mod download;
pub mod fetch;
pub mod pipeline;
pub mod search;
pub mod select;
pub mod summarize;

// Re-export for convenience
pub use backend::{BackendError, PdfBackend};
pub use chunk::{DEFAULT_CHUNK_SIZE, chunk_text};
pub use clean::clean_text;
pub use fetch::{Fetch, FetchError, FetchResponse, HttpFetcher};
pub use pipeline::{PipelineDeps, PipelineEvent, RunReport, run_pipeline, summarize_file};
pub use select::{Candidate, SelectedResource, select_resource};
pub use summarize::{SummarizeError, Summarizer, SummarizerKind, SummaryParams};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("query is empty")]
    EmptyQuery,
    #[error("Failed to retrieve search results: {0}")]
    SearchUnavailable(String),
    #[error("No papers found for the given query.")]
    NoCandidateFound,
    #[error("Failed to download paper from {locator}: {reason}")]
    DownloadFailed { locator: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("text extraction failed: {0}")]
    Extraction(#[from] BackendError),
    #[error("summarization failed: {0}")]
    Summarization(#[from] SummarizeError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// `NoCandidateFound` is reported at warning severity; every other
    /// variant is an error. Both end the current run.
    pub fn is_warning(&self) -> bool {
        matches!(self, CoreError::NoCandidateFound)
    }
}

/// Configuration for a pipeline run.
///
/// The download destination is not part of this struct: it is passed
/// explicitly to [`run_pipeline`] so that no filesystem layout is assumed here.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listing endpoint; the query string is appended to it.
    pub search_url: String,
    /// Prefix that a paper id is appended to, producing the PDF locator.
    pub pdf_base_url: String,
    /// Window size in characters.
    pub chunk_size: usize,
    pub summary: SummaryParams,
    /// Per-request HTTP timeout. `None` waits indefinitely.
    pub http_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_url: search::DEFAULT_SEARCH_URL.to_string(),
            pdf_base_url: select::DEFAULT_PDF_BASE_URL.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            summary: SummaryParams::default(),
            http_timeout_secs: None,
        }
    }
}

impl Config {
    /// Reject settings the summarizer stage cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk_size must be greater than 0".into()));
        }
        if self.summary.min_length > self.summary.max_length {
            return Err(CoreError::Config(format!(
                "min_length ({}) exceeds max_length ({})",
                self.summary.min_length, self.summary.max_length
            )));
        }
        Ok(())
    }
}

/// Default download destination: `<downloads>/paperdigest/paper.pdf`,
/// falling back to the home directory and then the temp directory.
pub fn default_save_path() -> PathBuf {
    dirs::download_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("paperdigest")
        .join("paper.pdf")
}
