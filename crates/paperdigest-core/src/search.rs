use crate::CoreError;
use crate::fetch::Fetch;

pub const DEFAULT_SEARCH_URL: &str = "https://arxiv.org/search/";

/// Build the listing URL for a query against the arXiv search page.
pub fn build_search_url(base: &str, query: &str) -> String {
    format!(
        "{}?query={}&searchtype=all&source=header",
        base,
        urlencoding::encode(query)
    )
}

/// Fetch the search listing for `query` and return its markup.
///
/// A query that is blank after trimming is [`CoreError::EmptyQuery`];
/// otherwise it is encoded exactly as given. Anything other than HTTP 200,
/// including a transport failure, is [`CoreError::SearchUnavailable`].
pub async fn search_listing(
    fetcher: &dyn Fetch,
    base: &str,
    query: &str,
) -> Result<String, CoreError> {
    if query.trim().is_empty() {
        return Err(CoreError::EmptyQuery);
    }

    let url = build_search_url(base, query);
    tracing::info!(url = %url, "searching");

    let resp = fetcher
        .get(&url)
        .await
        .map_err(|e| CoreError::SearchUnavailable(e.to_string()))?;

    if !resp.is_ok() {
        tracing::warn!(status = resp.status, "search endpoint returned non-200");
        return Err(CoreError::SearchUnavailable(format!("HTTP {}", resp.status)));
    }

    Ok(String::from_utf8_lossy(&resp.body).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::mock::MockFetch;

    #[test]
    fn url_encodes_query() {
        let url = build_search_url(DEFAULT_SEARCH_URL, "attention is all you need");
        assert_eq!(
            url,
            "https://arxiv.org/search/?query=attention%20is%20all%20you%20need&searchtype=all&source=header"
        );
    }

    #[test]
    fn url_encodes_reserved_characters() {
        let url = build_search_url("http://x/search/", "a&b=c");
        assert!(url.contains("query=a%26b%3Dc&"));
    }

    #[tokio::test]
    async fn empty_query_makes_no_request() {
        let fetch = MockFetch::new();
        let err = search_listing(&fetch, DEFAULT_SEARCH_URL, "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyQuery));
        assert!(fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn query_is_encoded_untrimmed() {
        let fetch = MockFetch::new().route("http://x/search/", 200, "<html></html>");
        search_listing(&fetch, "http://x/search/", " attention ")
            .await
            .unwrap();
        assert_eq!(
            fetch.calls(),
            vec!["http://x/search/?query=%20attention%20&searchtype=all&source=header".to_string()]
        );
    }

    #[tokio::test]
    async fn returns_body_on_200() {
        let fetch = MockFetch::new().route("http://x/search/", 200, "<html>ok</html>");
        let body = search_listing(&fetch, "http://x/search/", "transformers")
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn non_200_is_search_unavailable() {
        let fetch = MockFetch::new().route("http://x/search/", 503, "down");
        let err = search_listing(&fetch, "http://x/search/", "transformers")
            .await
            .unwrap_err();
        match err {
            CoreError::SearchUnavailable(reason) => assert_eq!(reason, "HTTP 503"),
            other => panic!("expected SearchUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn transport_error_is_search_unavailable() {
        let fetch = MockFetch::new().fail("http://x/search/", "connection refused");
        let err = search_listing(&fetch, "http://x/search/", "transformers")
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SearchUnavailable(_)));
    }
}
