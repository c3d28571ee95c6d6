//! The search → select → download → summarize run.
//!
//! Stages are awaited strictly one after another; the first error ends the
//! run and is returned to the caller.

use std::path::{Path, PathBuf};

use crate::backend::PdfBackend;
use crate::clean::clean_text;
use crate::download::download_resource;
use crate::fetch::Fetch;
use crate::search::search_listing;
use crate::select::{SelectedResource, select_resource};
use crate::summarize::{Summarizer, summarize_chunks};
use crate::{Config, CoreError};

/// External capabilities a run needs.
pub struct PipelineDeps<'a> {
    pub fetcher: &'a dyn Fetch,
    pub pdf: &'a dyn PdfBackend,
    pub summarizer: &'a dyn Summarizer,
}

/// Progress events emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    Searching {
        query: String,
    },
    Selected {
        paper_id: String,
        locator: String,
        score: usize,
    },
    Downloaded {
        path: PathBuf,
        bytes: u64,
    },
    Extracted {
        raw_chars: usize,
        cleaned_chars: usize,
        chunks: usize,
    },
    /// One chunk's summary, emitted as soon as it is produced.
    Summary {
        index: usize,
        total: usize,
        text: String,
    },
    Finished {
        chunks: usize,
    },
}

/// Outcome of a successful [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct RunReport {
    pub selected: SelectedResource,
    pub path: PathBuf,
    pub bytes: u64,
    pub chunks: usize,
}

/// Search for `query`, download the best match to `dest` and summarize it.
pub async fn run_pipeline(
    query: &str,
    dest: &Path,
    deps: &PipelineDeps<'_>,
    config: &Config,
    progress: impl Fn(PipelineEvent),
) -> Result<RunReport, CoreError> {
    config.validate()?;

    progress(PipelineEvent::Searching {
        query: query.to_string(),
    });
    let listing = search_listing(deps.fetcher, &config.search_url, query).await?;

    let selected =
        select_resource(&listing, &config.pdf_base_url).ok_or(CoreError::NoCandidateFound)?;
    tracing::info!(
        paper_id = %selected.paper_id,
        score = selected.score,
        "selected paper"
    );
    progress(PipelineEvent::Selected {
        paper_id: selected.paper_id.clone(),
        locator: selected.locator.clone(),
        score: selected.score,
    });

    let bytes = download_resource(deps.fetcher, &selected.locator, dest).await?;
    progress(PipelineEvent::Downloaded {
        path: dest.to_path_buf(),
        bytes,
    });

    let chunks = summarize_file(dest, deps.pdf, deps.summarizer, config, &progress).await?;

    Ok(RunReport {
        selected,
        path: dest.to_path_buf(),
        bytes,
        chunks,
    })
}

/// Extract, clean, chunk and summarize a local PDF.
///
/// Returns the number of chunks summarized.
pub async fn summarize_file(
    path: &Path,
    pdf: &dyn PdfBackend,
    summarizer: &dyn Summarizer,
    config: &Config,
    progress: impl Fn(PipelineEvent),
) -> Result<usize, CoreError> {
    config.validate()?;

    let raw = pdf.extract_text(path)?;
    let cleaned = clean_text(&raw);
    let raw_chars = raw.chars().count();
    let cleaned_chars = cleaned.chars().count();
    let expected = cleaned_chars.div_ceil(config.chunk_size);
    tracing::info!(
        path = %path.display(),
        raw_chars,
        cleaned_chars,
        chunks = expected,
        "extracted text"
    );
    progress(PipelineEvent::Extracted {
        raw_chars,
        cleaned_chars,
        chunks: expected,
    });

    let chunks = summarize_chunks(
        summarizer,
        &cleaned,
        config.chunk_size,
        &config.summary,
        |index, total, text| {
            progress(PipelineEvent::Summary {
                index,
                total,
                text: text.to_string(),
            })
        },
    )
    .await?;

    progress(PipelineEvent::Finished { chunks });
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::backend::BackendError;
    use crate::fetch::mock::MockFetch;
    use crate::summarize::mock::MockSummarizer;

    struct FixedText(&'static str);

    impl PdfBackend for FixedText {
        fn extract_text(&self, _path: &Path) -> Result<String, BackendError> {
            Ok(self.0.to_string())
        }
    }

    struct Unreadable;

    impl PdfBackend for Unreadable {
        fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
            Err(BackendError::Open {
                path: path.display().to_string(),
                message: "not a PDF".into(),
            })
        }
    }

    const LISTING: &str = r#"<ol>
        <li class="arxiv-result">
          <p class="list-title"><a href="https://arxiv.org/abs/1706.03762">arXiv:1706.03762</a></p>
          <p class="title is-5 mathjax">
            <span class="search-hit mathjax">Attention</span> Is
            <span class="search-hit mathjax">All</span> You
            <span class="search-hit mathjax">Need</span>
          </p>
        </li>
    </ol>"#;

    fn small_chunks() -> Config {
        Config {
            search_url: "http://search.test/".into(),
            pdf_base_url: "http://pdf.test/".into(),
            chunk_size: 10,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn events_follow_stage_order() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("paper.pdf");
        let fetch = MockFetch::new()
            .route("http://search.test/", 200, LISTING)
            .route("http://pdf.test/", 200, "%PDF");
        let pdf = FixedText("Body body body text. References [1] gone");
        let summarizer = MockSummarizer::new();
        let deps = PipelineDeps {
            fetcher: &fetch,
            pdf: &pdf,
            summarizer: &summarizer,
        };

        let events = Mutex::new(Vec::new());
        let report = run_pipeline("attention", &dest, &deps, &small_chunks(), |e| {
            events.lock().unwrap().push(e)
        })
        .await
        .unwrap();

        assert_eq!(report.selected.locator, "http://pdf.test/1706.03762");
        assert_eq!(report.bytes, 4);
        // "Body body body text." is 20 chars -> 2 windows of 10
        assert_eq!(report.chunks, 2);

        let events = events.into_inner().unwrap();
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                PipelineEvent::Searching { .. } => "search",
                PipelineEvent::Selected { .. } => "select",
                PipelineEvent::Downloaded { .. } => "download",
                PipelineEvent::Extracted { .. } => "extract",
                PipelineEvent::Summary { .. } => "summary",
                PipelineEvent::Finished { .. } => "finish",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["search", "select", "download", "extract", "summary", "summary", "finish"]
        );
        assert_eq!(
            fetch.calls(),
            vec![
                "http://search.test/?query=attention&searchtype=all&source=header".to_string(),
                "http://pdf.test/1706.03762".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn no_candidate_stops_before_download() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("paper.pdf");
        let fetch = MockFetch::new().route("http://search.test/", 200, "<ol></ol>");
        let summarizer = MockSummarizer::new();
        let deps = PipelineDeps {
            fetcher: &fetch,
            pdf: &FixedText("unused"),
            summarizer: &summarizer,
        };

        let err = run_pipeline("nothing matches", &dest, &deps, &small_chunks(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::NoCandidateFound));
        assert!(err.is_warning());
        assert_eq!(fetch.calls().len(), 1);
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn invalid_config_rejected_before_any_request() {
        let fetch = MockFetch::new();
        let summarizer = MockSummarizer::new();
        let deps = PipelineDeps {
            fetcher: &fetch,
            pdf: &FixedText("unused"),
            summarizer: &summarizer,
        };
        let config = Config {
            chunk_size: 0,
            ..Config::default()
        };
        let err = run_pipeline("q", Path::new("unused.pdf"), &deps, &config, |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_propagates() {
        let summarizer = MockSummarizer::new();
        let err = summarize_file(
            Path::new("missing.pdf"),
            &Unreadable,
            &summarizer,
            &Config::default(),
            |_| {},
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
        assert!(summarizer.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summarize_file_streams_before_finishing() {
        let summarizer = MockSummarizer::new();
        let events = Mutex::new(Vec::new());
        let n = summarize_file(
            Path::new("local.pdf"),
            &FixedText("abcdefghij klmnopqrs"),
            &summarizer,
            &small_chunks(),
            |e| events.lock().unwrap().push(e),
        )
        .await
        .unwrap();
        assert_eq!(n, 2);

        let events = events.into_inner().unwrap();
        assert_eq!(
            events[0],
            PipelineEvent::Extracted {
                raw_chars: 20,
                cleaned_chars: 20,
                chunks: 2
            }
        );
        assert_eq!(
            events[1],
            PipelineEvent::Summary {
                index: 0,
                total: 2,
                text: "summary of abcde".into()
            }
        );
        assert_eq!(events.last(), Some(&PipelineEvent::Finished { chunks: 2 }));
    }
}
