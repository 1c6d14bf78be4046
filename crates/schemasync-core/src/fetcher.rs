use crate::{Error, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Strict HTTP downloader for OpenAPI schema documents.
pub struct SchemaFetcher {
    client: Client,
    min_schema_bytes: usize,
}

impl SchemaFetcher {
    /// Creates a fetcher that rejects bodies shorter than `min_schema_bytes`.
    pub fn new(min_schema_bytes: usize) -> Result<Self> {
        Self::with_timeout(min_schema_bytes, Duration::from_secs(30))
    }

    /// Creates a fetcher with a custom request timeout (primarily for tests)
    pub fn with_timeout(min_schema_bytes: usize, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("schemasync/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self {
            client,
            min_schema_bytes,
        })
    }

    /// Minimum accepted body size in bytes.
    #[must_use]
    pub const fn min_schema_bytes(&self) -> usize {
        self.min_schema_bytes
    }

    /// Downloads the schema at `url`.
    ///
    /// Any non-success status is an error, and so is a body below the size
    /// threshold: a backend can serve a short error page with `200 OK`.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<SchemaDocument> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            // Map 404 to a clearer NotFound error
            if status == StatusCode::NOT_FOUND {
                return Err(Error::NotFound(format!(
                    "Schema disappeared from '{url}' between discovery and download"
                )));
            }

            response.error_for_status_ref()?;
            // Unfollowed 3xx and friends: nothing usable was served
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        debug!(size = bytes.len(), "downloaded schema body");

        if bytes.len() < self.min_schema_bytes {
            return Err(Error::SchemaTooSmall {
                url: url.to_string(),
                size: bytes.len(),
                min_bytes: self.min_schema_bytes,
                content: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }

        let document = SchemaDocument::new(url.to_string(), bytes);
        info!(
            "Fetched {} bytes from {} (openapi {})",
            document.len(),
            url,
            document.openapi_version().as_deref().unwrap_or("unknown")
        );
        Ok(document)
    }
}

/// A downloaded schema, kept byte-for-byte as served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDocument {
    url: String,
    bytes: Vec<u8>,
    sha256: String,
}

impl SchemaDocument {
    /// Wrap raw schema bytes.
    #[must_use]
    pub fn new(url: String, bytes: Vec<u8>) -> Self {
        let sha256 = calculate_sha256(&bytes);
        Self { url, bytes, sha256 }
    }

    /// URL the document came from.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Raw body.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Base64 `SHA256` of the body.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// Best-effort `openapi` (or legacy `swagger`) version, for logging only.
    #[must_use]
    pub fn openapi_version(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.bytes).ok()?;
        value
            .get("openapi")
            .or_else(|| value.get("swagger"))
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)
    }

    /// Write the body unmodified to `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.bytes)?;
        debug!(path = %path.display(), "wrote schema");
        Ok(())
    }
}

pub(crate) fn calculate_sha256(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();
    STANDARD.encode(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    const SCHEMA: &str = r#"{"openapi":"3.1.0","info":{"title":"SMS Gateway","version":"0.1.0"},"paths":{"/health":{"get":{"operationId":"system-health"}}}}"#;

    async fn serve(body: &str, status: u16) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_returns_body_unmodified() -> anyhow::Result<()> {
        let mock_server = serve(SCHEMA, 200).await;
        let url = format!("{}/openapi.json", mock_server.uri());

        let document = SchemaFetcher::new(100)?.fetch(&url).await?;

        assert_eq!(document.bytes(), SCHEMA.as_bytes());
        assert_eq!(document.url(), url);
        assert_eq!(document.openapi_version().as_deref(), Some("3.1.0"));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_rejects_short_error_page() -> anyhow::Result<()> {
        // 50 bytes served with a 200 status
        let page = "<html><body>502 Bad Gateway</body></html>\n........";
        assert_eq!(page.len(), 50);
        let mock_server = serve(page, 200).await;
        let url = format!("{}/openapi.json", mock_server.uri());

        match SchemaFetcher::new(100)?.fetch(&url).await {
            Err(Error::SchemaTooSmall {
                size,
                min_bytes,
                content,
                ..
            }) => {
                assert_eq!(size, 50);
                assert_eq!(min_bytes, 100);
                assert_eq!(content, page);
            },
            other => panic!("expected SchemaTooSmall, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_threshold_is_inclusive() -> anyhow::Result<()> {
        let body = "x".repeat(100);
        let mock_server = serve(&body, 200).await;
        let url = format!("{}/openapi.json", mock_server.uri());

        let fetcher = SchemaFetcher::new(100)?;
        assert_eq!(fetcher.fetch(&url).await?.len(), 100);

        let stricter = SchemaFetcher::new(101)?;
        assert!(matches!(
            stricter.fetch(&url).await,
            Err(Error::SchemaTooSmall { size: 100, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_404_error() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        let url = format!("{}/openapi.json", mock_server.uri());

        let result = SchemaFetcher::new(100)?.fetch(&url).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_500_error_is_strict() -> anyhow::Result<()> {
        let mock_server = serve(&"Internal Server Error ".repeat(20), 500).await;
        let url = format!("{}/openapi.json", mock_server.uri());

        match SchemaFetcher::new(100)?.fetch(&url).await {
            Err(Error::Network(e)) => {
                assert_eq!(e.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
            },
            other => panic!("expected network error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_unfollowed_redirect_is_network_error() -> anyhow::Result<()> {
        let mock_server = serve(&"see other ".repeat(20), 300).await;
        let url = format!("{}/openapi.json", mock_server.uri());

        let err = SchemaFetcher::new(100)?.fetch(&url).await.unwrap_err();
        assert!(matches!(err, Error::HttpStatus { status: 300, .. }));
        assert_eq!(err.category(), "network");
        assert_eq!(err.exit_code(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_timeout() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SCHEMA)
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;
        let url = format!("{}/openapi.json", mock_server.uri());

        let fetcher = SchemaFetcher::with_timeout(100, Duration::from_millis(50))?;
        assert!(matches!(fetcher.fetch(&url).await, Err(Error::Network(_))));
        Ok(())
    }

    #[test]
    fn test_write_to_preserves_bytes() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("openapi.json");
        let document = SchemaDocument::new("http://x/openapi.json".to_string(), SCHEMA.into());

        document.write_to(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), SCHEMA.as_bytes());
    }

    #[test]
    fn test_sha256_calculation() {
        let document = SchemaDocument::new(String::new(), b"hello world".to_vec());
        assert_eq!(
            document.sha256(),
            "uU0nuZNNPgilLlLX2n2r+sSE7+N6U4DukIj3rOLvzek="
        );
    }

    #[test]
    fn test_openapi_version_detection() {
        let swagger = SchemaDocument::new(String::new(), br#"{"swagger":"2.0"}"#.to_vec());
        assert_eq!(swagger.openapi_version().as_deref(), Some("2.0"));

        let html = SchemaDocument::new(String::new(), b"<html></html>".to_vec());
        assert_eq!(html.openapi_version(), None);
    }
}
