use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("could not open {path} as a PDF: {message}")]
    Open { path: String, message: String },
    #[error("failed to read page text: {0}")]
    Page(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns a downloaded paper into raw text.
///
/// The returned text is uncleaned; [`crate::clean::clean_text`] and
/// [`crate::chunk::chunk_text`] run afterwards.
pub trait PdfBackend: Send + Sync {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError>;
}
