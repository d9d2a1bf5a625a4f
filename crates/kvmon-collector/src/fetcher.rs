use crate::error::CollectError;
use anyhow::{Context, Result};
use kvmon_common::Target;
use reqwest::Client;

/// Source of raw KV listings for a target.
///
/// The production implementation is [`HttpFetcher`]; tests substitute
/// scripted fetchers to drive the poller through failure paths.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Performs one fetch of the recursive listing for `target` and returns
    /// the response body.
    async fn fetch(&self, target: &Target) -> Result<Vec<u8>>;
}

/// Fetches `GET {base_uri}/v1/kv/{directory}/?recurse&dc={dc}` over HTTP.
///
/// One request per call, no retries and no timeout beyond the client's
/// defaults. A non-2xx status is not an error here; its body is handed to the
/// parser like any other.
#[derive(Clone)]
pub struct HttpFetcher {
    base_uri: String,
    client: Client,
}

impl HttpFetcher {
    pub fn new(base_uri: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_client(base_uri, client))
    }

    pub fn with_client(base_uri: &str, client: Client) -> Self {
        Self {
            base_uri: base_uri.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Builds the recursive listing URL for `target`.
    ///
    /// # Examples
    ///
    /// ```
    /// use kvmon_collector::HttpFetcher;
    /// use kvmon_common::Target;
    ///
    /// let fetcher = HttpFetcher::new("http://consul:8500/").unwrap();
    /// let url = fetcher.kv_url(&Target::new("dc1", "app/config"));
    /// assert_eq!(url, "http://consul:8500/v1/kv/app/config/?recurse&dc=dc1");
    /// ```
    pub fn kv_url(&self, target: &Target) -> String {
        format!(
            "{}/v1/kv/{}/?recurse&dc={}",
            self.base_uri,
            target.directory.trim_matches('/'),
            target.dc
        )
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, target: &Target) -> Result<Vec<u8>> {
        let url = self.kv_url(target);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| CollectError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(
                dc = %target.dc,
                directory = %target.directory,
                status = status.as_u16(),
                "KV endpoint returned non-success status"
            );
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| CollectError::Transport { url, source })?;
        Ok(body.to_vec())
    }
}
