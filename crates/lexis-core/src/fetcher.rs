use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::config::FetchConfig;
use crate::{Error, Result};

/// Source of raw dictionary pages.
///
/// The lookup pipeline only needs "give me the HTML for this word"; tests
/// substitute an in-memory implementation.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    /// Fetch the dictionary page for `word`.
    async fn fetch_document(&self, word: &str) -> Result<String>;
}

/// HTTP client for fetching dictionary pages.
pub struct Fetcher {
    client: Client,
    base_url: Url,
}

impl Fetcher {
    /// Creates a fetcher for `base_url` with the default 30 second timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a fetcher from the `[fetch]` configuration section.
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        Self::with_timeout(&config.base_url, config.timeout())
    }

    /// Creates a fetcher with a custom request timeout (primarily for tests)
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(format!("'{base_url}' cannot be used as a base URL")));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lexis/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self { client, base_url })
    }

    /// Build the page URL for `word`: `<base>/dictionary/<percent-encoded word>`.
    pub fn page_url(&self, word: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(format!("'{}' cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .push("dictionary")
            .push(word);
        Ok(url)
    }

    /// Fetches a URL and returns the response body.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!("No dictionary page at '{url}'")));
            }
            return Err(Error::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response.text().await?;
        info!("Fetched {} bytes from {}", content.len(), url);
        Ok(content)
    }
}

#[async_trait]
impl DocumentFetcher for Fetcher {
    async fn fetch_document(&self, word: &str) -> Result<String> {
        let url = self.page_url(word)?;
        debug!("Visiting {}", url);
        self.fetch(url.as_str()).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    #[test]
    fn test_page_url_encodes_word() {
        let fetcher = Fetcher::new("https://www.ldoceonline.com").unwrap();

        assert_eq!(
            fetcher.page_url("run").unwrap().as_str(),
            "https://www.ldoceonline.com/dictionary/run"
        );
        assert_eq!(
            fetcher.page_url("ice cream").unwrap().as_str(),
            "https://www.ldoceonline.com/dictionary/ice%20cream"
        );
        assert_eq!(
            fetcher.page_url("a/b?c").unwrap().as_str(),
            "https://www.ldoceonline.com/dictionary/a%2Fb%3Fc"
        );
    }

    #[test]
    fn test_page_url_respects_base_path() {
        let fetcher = Fetcher::new("http://localhost:8080/mirror/").unwrap();
        assert_eq!(
            fetcher.page_url("run").unwrap().as_str(),
            "http://localhost:8080/mirror/dictionary/run"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(Fetcher::new("not a url"), Err(Error::InvalidUrl(_))));
        assert!(matches!(
            Fetcher::new("mailto:someone@example.com"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_document_success() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dictionary/hello"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hello</html>"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new(&mock_server.uri())?;
        let html = fetcher.fetch_document("hello").await?;

        assert_eq!(html, "<html>hello</html>");
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_404_maps_to_not_found() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dictionary/qwxz"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new(&mock_server.uri())?;
        match fetcher.fetch_document("qwxz").await {
            Err(Error::NotFound(msg)) => assert!(msg.contains("/dictionary/qwxz")),
            other => panic!("expected NotFound, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_500_maps_to_http_error() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dictionary/run"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::new(&mock_server.uri())?;
        match fetcher.fetch_document("run").await {
            Err(err @ Error::Http { status: 500, .. }) => assert!(err.is_recoverable()),
            other => panic!("expected Http 500, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_network_error() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dictionary/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("late")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::with_timeout(&mock_server.uri(), Duration::from_millis(50))?;
        match fetcher.fetch_document("slow").await {
            Err(Error::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
        Ok(())
    }
}
