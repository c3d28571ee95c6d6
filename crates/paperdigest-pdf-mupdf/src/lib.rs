use std::path::Path;

use mupdf::{Document, TextPageFlags};

use paperdigest_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`].
///
/// This crate isolates the mupdf dependency (AGPL-3.0) from the rest of the
/// workspace.
///
/// Running headers and footers (journal names, page numbers) can optionally
/// be dropped by excluding a band at the top and bottom of every page. Both
/// bands are off by default so the summarizer sees the whole page.
#[derive(Default)]
pub struct MupdfBackend {
    /// Fraction of page height from bottom to exclude as footer (0.0–1.0).
    footer_exclusion_ratio: Option<f32>,
    /// Fraction of page height from top to exclude as header (0.0–1.0).
    header_exclusion_ratio: Option<f32>,
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the footer exclusion ratio. Pass `0.0` to disable.
    pub fn with_footer_exclusion(mut self, ratio: f32) -> Self {
        self.footer_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    /// Set the header exclusion ratio. Pass `0.0` to disable.
    pub fn with_header_exclusion(mut self, ratio: f32) -> Self {
        self.header_exclusion_ratio = if ratio > 0.0 { Some(ratio) } else { None };
        self
    }

    pub fn header_exclusion(&self) -> Option<f32> {
        self.header_exclusion_ratio
    }

    pub fn footer_exclusion(&self) -> Option<f32> {
        self.footer_exclusion_ratio
    }

    fn open(path: &Path) -> Result<Document, BackendError> {
        let open_err = |message: String| BackendError::Open {
            path: path.display().to_string(),
            message,
        };
        let path_str = path
            .to_str()
            .ok_or_else(|| open_err("invalid path encoding".into()))?;
        if !path.exists() {
            return Err(open_err("file does not exist".into()));
        }
        Document::open(path_str).map_err(|e| open_err(e.to_string()))
    }
}

impl PdfBackend for MupdfBackend {
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        let document = Self::open(path)?;
        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::Page(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::Page(e.to_string()))?;
            let text_page = page
                .to_text_page(TextPageFlags::empty())
                .map_err(|e| BackendError::Page(e.to_string()))?;

            let bounds = page
                .bounds()
                .map_err(|e| BackendError::Page(e.to_string()))?;
            let height = bounds.y1 - bounds.y0;
            let header_limit = self.header_exclusion_ratio.map(|r| bounds.y0 + height * r);
            let footer_limit = self.footer_exclusion_ratio.map(|r| bounds.y1 - height * r);

            let mut page_text = String::new();
            for block in text_page.blocks() {
                let block_bounds = block.bounds();
                if header_limit.is_some_and(|limit| block_bounds.y1 <= limit) {
                    continue;
                }
                if footer_limit.is_some_and(|limit| block_bounds.y0 >= limit) {
                    continue;
                }

                for line in block.lines() {
                    page_text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(pages_text.join("\n"))
    }
}
