//! Summarization backends and the chunk-by-chunk driver.

pub mod huggingface;
pub mod ollama;

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::CoreError;
use crate::chunk::chunk_text;

pub use huggingface::HuggingFaceSummarizer;
pub use ollama::OllamaSummarizer;

#[derive(Error, Debug)]
pub enum SummarizeError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{backend} returned HTTP {status}: {message}")]
    Api {
        backend: String,
        status: u16,
        message: String,
    },
    #[error("unexpected response from {backend}: {message}")]
    InvalidResponse { backend: String, message: String },
    #[error("{0} returned an empty summary")]
    Empty(String),
}

/// Length bounds handed to the model.
///
/// The bounds are in the model's own units (tokens for both shipped backends)
/// while chunks are measured in characters; the two are not reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    pub min_length: u32,
    pub max_length: u32,
    /// Sampling stays off for reproducible output.
    pub do_sample: bool,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            min_length: 30,
            max_length: 150,
            do_sample: false,
        }
    }
}

pub type SummaryFuture<'a> =
    Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>>;

/// An abstractive summarization model.
pub trait Summarizer: Send + Sync {
    /// Display name, e.g. "Hugging Face (sshleifer/distilbart-cnn-12-6)".
    fn name(&self) -> &str;

    /// Summarize one chunk of text.
    fn summarize<'a>(&'a self, text: &'a str, params: &'a SummaryParams) -> SummaryFuture<'a>;
}

/// Which [`Summarizer`] implementation to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizerKind {
    #[default]
    HuggingFace,
    Ollama,
}

impl fmt::Display for SummarizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SummarizerKind::HuggingFace => write!(f, "huggingface"),
            SummarizerKind::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for SummarizerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "huggingface" | "hf" => Ok(SummarizerKind::HuggingFace),
            "ollama" => Ok(SummarizerKind::Ollama),
            other => Err(format!(
                "unknown summarizer backend '{other}' (expected 'huggingface' or 'ollama')"
            )),
        }
    }
}

/// Connection settings for building a summarizer.
#[derive(Clone, Default)]
pub struct SummarizerSettings {
    pub kind: SummarizerKind,
    /// Model name; the backend default when `None`.
    pub model: Option<String>,
    /// Endpoint base URL; the backend default when `None`.
    pub base_url: Option<String>,
    pub api_token: Option<String>,
}

impl fmt::Debug for SummarizerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerSettings")
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Build the configured backend over a shared HTTP client.
pub fn build_summarizer(
    settings: &SummarizerSettings,
    client: reqwest::Client,
) -> Box<dyn Summarizer> {
    match settings.kind {
        SummarizerKind::HuggingFace => {
            let mut s = HuggingFaceSummarizer::new(client);
            if let Some(model) = &settings.model {
                s = s.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                s = s.with_base_url(url);
            }
            if let Some(token) = &settings.api_token {
                s = s.with_token(token);
            }
            Box::new(s)
        }
        SummarizerKind::Ollama => {
            let mut s = OllamaSummarizer::new(client);
            if let Some(model) = &settings.model {
                s = s.with_model(model);
            }
            if let Some(url) = &settings.base_url {
                s = s.with_base_url(url);
            }
            Box::new(s)
        }
    }
}

/// Summarize `text` one window at a time.
///
/// Each summary is handed to `on_summary(index, total, summary)` before the
/// next window is sent, so callers can display results as they arrive. The
/// first failure stops the loop; summaries already emitted are not retracted.
/// Returns the number of windows summarized.
pub async fn summarize_chunks(
    summarizer: &dyn Summarizer,
    text: &str,
    chunk_size: usize,
    params: &SummaryParams,
    mut on_summary: impl FnMut(usize, usize, &str),
) -> Result<usize, CoreError> {
    let chunks = chunk_text(text, chunk_size);
    let total = chunks.len();

    for (index, chunk) in chunks.into_iter().enumerate() {
        tracing::debug!(
            index,
            total,
            chars = chunk.chars().count(),
            backend = summarizer.name(),
            "summarizing chunk"
        );
        let summary = summarizer.summarize(chunk, params).await?;
        on_summary(index, total, &summary);
    }

    Ok(total)
}


#[cfg(test)]
mod tests {
    use super::mock::MockSummarizer;
    use super::*;

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("HuggingFace".parse::<SummarizerKind>(), Ok(SummarizerKind::HuggingFace));
        assert_eq!("hf".parse::<SummarizerKind>(), Ok(SummarizerKind::HuggingFace));
        assert_eq!(" ollama ".parse::<SummarizerKind>(), Ok(SummarizerKind::Ollama));
        assert!("gpt".parse::<SummarizerKind>().is_err());
    }

    #[test]
    fn kind_display_round_trips() {
        for kind in [SummarizerKind::HuggingFace, SummarizerKind::Ollama] {
            assert_eq!(kind.to_string().parse::<SummarizerKind>(), Ok(kind));
        }
    }

    #[test]
    fn settings_debug_masks_token() {
        let settings = SummarizerSettings {
            api_token: Some("hf_secret".into()),
            ..Default::default()
        };
        let dbg = format!("{settings:?}");
        assert!(!dbg.contains("hf_secret"));
        assert!(dbg.contains("***"));
    }

    #[tokio::test]
    async fn emits_in_order_one_per_window() {
        let summarizer = MockSummarizer::new();
        let text = "aaaaabbbbbccc";
        let mut emitted = Vec::new();
        let n = summarize_chunks(&summarizer, text, 5, &SummaryParams::default(), |i, total, s| {
            emitted.push((i, total, s.to_string()))
        })
        .await
        .unwrap();

        assert_eq!(n, 3);
        assert_eq!(
            emitted,
            vec![
                (0, 3, "summary of aaaaa".to_string()),
                (1, 3, "summary of bbbbb".to_string()),
                (2, 3, "summary of ccc".to_string()),
            ]
        );
        assert_eq!(*summarizer.seen.lock().unwrap(), vec!["aaaaa", "bbbbb", "ccc"]);
    }

    #[tokio::test]
    async fn failure_aborts_remaining_windows() {
        let summarizer = MockSummarizer::failing_on(1);
        let mut emitted = Vec::new();
        let err = summarize_chunks(
            &summarizer,
            "aaaaabbbbbccccc",
            5,
            &SummaryParams::default(),
            |i, _, _| emitted.push(i),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::Summarization(_)));
        assert_eq!(emitted, vec![0]);
        assert_eq!(summarizer.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_text_summarizes_nothing() {
        let summarizer = MockSummarizer::new();
        let n = summarize_chunks(&summarizer, "", 2048, &SummaryParams::default(), |_, _, _| {
            panic!("no windows expected")
        })
        .await
        .unwrap();
        assert_eq!(n, 0);
    }
}
