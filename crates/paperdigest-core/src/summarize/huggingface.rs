use serde::{Deserialize, Serialize};

use super::{SummarizeError, Summarizer, SummaryFuture, SummaryParams};

/// Serverless inference through the Hugging Face router.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";
/// Default checkpoint of the transformers summarization pipeline.
pub const DEFAULT_MODEL: &str = "sshleifer/distilbart-cnn-12-6";

/// Summarizer backed by the Hugging Face Inference API.
pub struct HuggingFaceSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    token: Option<String>,
    name: String,
}

#[derive(Serialize)]
struct Request<'a> {
    inputs: &'a str,
    parameters: Parameters,
}

#[derive(Serialize)]
struct Parameters {
    min_length: u32,
    max_length: u32,
    do_sample: bool,
}

#[derive(Deserialize)]
struct SummaryItem {
    summary_text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: String,
}

impl HuggingFaceSummarizer {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            token: None,
            name: format!("Hugging Face ({DEFAULT_MODEL})"),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self.name = format!("Hugging Face ({model})");
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

impl Summarizer for HuggingFaceSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn summarize<'a>(&'a self, text: &'a str, params: &'a SummaryParams) -> SummaryFuture<'a> {
        Box::pin(async move {
            let body = Request {
                inputs: text,
                parameters: Parameters {
                    min_length: params.min_length,
                    max_length: params.max_length,
                    do_sample: params.do_sample,
                },
            };

            let mut req = self.client.post(self.endpoint()).json(&body);
            if let Some(token) = &self.token {
                req = req.bearer_auth(token);
            }

            let resp = req.send().await?;
            let status = resp.status();
            let raw = resp.text().await?;

            if !status.is_success() {
                return Err(SummarizeError::Api {
                    backend: self.name.clone(),
                    status: status.as_u16(),
                    message: error_message(&raw),
                });
            }

            parse_summary(&raw, &self.name)
        })
    }
}

/// Pull `summary_text` out of a `[{"summary_text": ...}]` body.
pub(crate) fn parse_summary(raw: &str, backend: &str) -> Result<String, SummarizeError> {
    let items: Vec<SummaryItem> =
        serde_json::from_str(raw).map_err(|e| SummarizeError::InvalidResponse {
            backend: backend.to_string(),
            message: e.to_string(),
        })?;

    let summary = items
        .into_iter()
        .next()
        .map(|item| item.summary_text.trim().to_string())
        .unwrap_or_default();

    if summary.is_empty() {
        return Err(SummarizeError::Empty(backend.to_string()));
    }
    Ok(summary)
}

/// The API reports failures as `{"error": "..."}`; fall back to the raw body.
fn error_message(raw: &str) -> String {
    serde_json::from_str::<ApiError>(raw)
        .map(|e| e.error)
        .unwrap_or_else(|_| raw.trim().to_string())
}
