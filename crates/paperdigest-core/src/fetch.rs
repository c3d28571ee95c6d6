//! HTTP GET capability used by the search and download stages.
//!
//! Stages only see a status code and a body; deciding what counts as success
//! is left to the caller.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Other(String),
}

/// Status and body of a completed GET.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Only a plain 200 counts; redirects are followed by the client before this point.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Drain a reqwest response into memory.
    pub async fn from_response(resp: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(Self { status, body })
    }
}

pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FetchResponse, FetchError>> + Send + 'a>>;

/// Something that can GET a URL.
pub trait Fetch: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> FetchFuture<'a>;
}

/// [`Fetch`] over a shared `reqwest::Client`.
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("paperdigest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, timeout))
    }

    pub fn with_client(client: reqwest::Client, timeout: Option<Duration>) -> Self {
        Self { client, timeout }
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Fetch for HttpFetcher {
    fn get<'a>(&'a self, url: &'a str) -> FetchFuture<'a> {
        Box::pin(async move {
            let mut req = self.client.get(url);
            if let Some(timeout) = self.timeout {
                req = req.timeout(timeout);
            }
            let resp = req.send().await?;
            tracing::debug!(url, status = resp.status().as_u16(), "GET complete");
            Ok(FetchResponse::from_response(resp).await?)
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_200_is_ok() {
        let ok = FetchResponse {
            status: 200,
            body: vec![],
        };
        assert!(ok.is_ok());
        for status in [201, 204, 301, 404, 503] {
            let resp = FetchResponse {
                status,
                body: vec![],
            };
            assert!(!resp.is_ok(), "status {status} must not count as success");
        }
    }

    #[tokio::test]
    async fn from_response_keeps_status_and_body() {
        let http_resp = http::Response::builder()
            .status(503)
            .body("busy")
            .unwrap();
        let resp = FetchResponse::from_response(reqwest::Response::from(http_resp))
            .await
            .unwrap();
        assert_eq!(resp.status, 503);
        assert_eq!(resp.body, b"busy");
        assert!(!resp.is_ok());
    }

    #[tokio::test]
    async fn mock_unrouted_url_is_404() {
        let fetch = mock::MockFetch::new().route("https://a/", 200, "x");
        let resp = fetch.get("https://b/").await.unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(fetch.calls(), vec!["https://b/".to_string()]);
    }
}
