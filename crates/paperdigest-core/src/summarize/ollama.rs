use serde::{Deserialize, Serialize};

use super::{SummarizeError, Summarizer, SummaryFuture, SummaryParams};

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.2";

/// Summarizer backed by a local Ollama server (`/api/generate`).
///
/// Ollama has no minimum-length control, so the bounds are stated in the
/// prompt and `max_length` also caps `num_predict`.
pub struct OllamaSummarizer {
    client: reqwest::Client,
    base_url: String,
    model: String,
    name: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaSummarizer {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            name: format!("Ollama ({DEFAULT_MODEL})"),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self.name = format!("Ollama ({model})");
        self
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn request<'a>(&'a self, text: &str, params: &SummaryParams) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.model,
            prompt: build_prompt(text, params),
            stream: false,
            options: GenerateOptions {
                // Greedy decoding unless sampling was asked for.
                temperature: if params.do_sample { 0.8 } else { 0.0 },
                num_predict: params.max_length,
            },
        }
    }
}

fn build_prompt(text: &str, params: &SummaryParams) -> String {
    format!(
        "Summarize the following excerpt from an academic paper in plain prose, \
         between {} and {} tokens long. Reply with the summary only.\n\n{}",
        params.min_length, params.max_length, text
    )
}

impl Summarizer for OllamaSummarizer {
    fn name(&self) -> &str {
        &self.name
    }

    fn summarize<'a>(&'a self, text: &'a str, params: &'a SummaryParams) -> SummaryFuture<'a> {
        Box::pin(async move {
            let url = format!("{}/api/generate", self.base_url);
            let resp = self
                .client
                .post(&url)
                .json(&self.request(text, params))
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                let message = resp.text().await.unwrap_or_default();
                return Err(SummarizeError::Api {
                    backend: self.name.clone(),
                    status: status.as_u16(),
                    message: message.trim().to_string(),
                });
            }

            let body: GenerateResponse =
                resp.json().await.map_err(|e| SummarizeError::InvalidResponse {
                    backend: self.name.clone(),
                    message: e.to_string(),
                })?;

            let summary = body.response.trim().to_string();
            if summary.is_empty() {
                return Err(SummarizeError::Empty(self.name.clone()));
            }
            Ok(summary)
        })
    }
}
