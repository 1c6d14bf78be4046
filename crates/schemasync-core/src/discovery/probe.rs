//! Ordered probing of candidate schema URLs.

use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

/// Timeout for each probe request.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Existence check for a single candidate URL.
///
/// Implementations must not retry; a probe either succeeds or it doesn't.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Returns `true` if `url` answered with a success status.
    async fn exists(&self, url: &str) -> bool;
}

/// HTTP probe issuing a `GET` and accepting any final 2xx status.
///
/// `GET` rather than `HEAD` because common backends (FastAPI among them)
/// answer `405` to `HEAD` on their schema route. The body is never read.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Build a probe client with the fixed probe timeout.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(PROBE_TIMEOUT)
            .user_agent(concat!("schemasync/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn exists(&self, url: &str) -> bool {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!(%url, %status, "probe response");
                status.is_success()
            },
            Err(e) => {
                debug!(%url, error = %e, "probe failed");
                false
            },
        }
    }
}

/// One candidate location for the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeCandidate {
    /// Probe path as configured, e.g. `/api/v1/openapi.json`.
    pub path: String,
    /// Full URL that gets probed.
    pub url: String,
}

/// The winning candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredEndpoint {
    /// Full URL of the schema document.
    pub url: String,
    /// Probe path that matched.
    pub probe_path: String,
    /// Number of candidates probed, including the winner.
    pub attempts: usize,
}

/// Walks an ordered candidate list and returns the first URL that exists.
pub struct Discoverer<P = HttpProbe> {
    base_url: String,
    candidates: Vec<ProbeCandidate>,
    probe: P,
}

impl Discoverer<HttpProbe> {
    /// Create a discoverer that probes over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an http(s) URL, or
    /// [`Error::Network`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, probe_paths: &[String]) -> Result<Self> {
        Self::with_probe(base_url, probe_paths, HttpProbe::new()?)
    }
}

impl<P: Probe> Discoverer<P> {
    /// Create a discoverer with a custom probe.
    ///
    /// Candidate URLs are `base_url` (trailing `/` removed) with each probe
    /// path appended, so a base URL that carries a path prefix keeps it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `base_url` is not an http(s) URL.
    pub fn with_probe(base_url: &str, probe_paths: &[String], probe: P) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| Error::InvalidUrl(format!("'{base_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::InvalidUrl(format!(
                "'{base_url}' must use http or https"
            )));
        }

        let root = base_url.trim_end_matches('/');
        let candidates = probe_paths
            .iter()
            .map(|path| ProbeCandidate {
                path: path.clone(),
                url: format!("{root}{path}"),
            })
            .collect();

        Ok(Self {
            base_url: root.to_string(),
            candidates,
            probe,
        })
    }

    /// Candidates in probe order.
    #[must_use]
    pub fn candidates(&self) -> &[ProbeCandidate] {
        &self.candidates
    }

    /// Probe candidates in order and return the first that exists.
    ///
    /// Stops at the first success; later candidates are never contacted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DiscoveryFailed`] listing every URL tried when no
    /// candidate succeeds.
    #[instrument(skip_all, fields(base_url = %self.base_url))]
    pub async fn discover(&self) -> Result<DiscoveredEndpoint> {
        for (index, candidate) in self.candidates.iter().enumerate() {
            debug!(url = %candidate.url, "probing");
            if self.probe.exists(&candidate.url).await {
                info!(url = %candidate.url, "found OpenAPI schema");
                return Ok(DiscoveredEndpoint {
                    url: candidate.url.clone(),
                    probe_path: candidate.path.clone(),
                    attempts: index + 1,
                });
            }
        }

        Err(Error::DiscoveryFailed {
            base_url: self.base_url.clone(),
            tried: self.candidates.iter().map(|c| c.url.clone()).collect(),
        })
    }
}
