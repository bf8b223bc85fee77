//! Content-addressable metadata cache: fetch a JSON document by URL,
//! caching the raw response text under `cache/<sha256(url)>.json`
//! (`spec.md` §4.2).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tracing::{debug, trace, warn};
use ypms_core::{Error, Result};

/// Fixed User-Agent carried over from the Python reference implementation,
/// so sources that gate on it keep working.
pub const USER_AGENT: &str = "YPMS/1.1 (+https://github.com/YPSH-DGC/YPMS/)";

/// Fixed per-request timeout (`spec.md` §4.2 / §6).
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Fetches and caches JSON documents served by package sources.
#[derive(Debug, Clone)]
pub struct MetadataCache {
    client: reqwest::Client,
    cache_dir: PathBuf,
}

impl MetadataCache {
    /// Build a cache rooted at `cache_dir` (created lazily on first write).
    pub fn new(cache_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            cache_dir: cache_dir.into(),
        })
    }

    /// The underlying HTTP client, shared with the downloader so both honor
    /// the same User-Agent and timeout.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        let key = hex::encode(hasher.finalize());
        self.cache_dir.join(format!("{key}.json"))
    }

    /// Fetch the raw JSON text at `url`, honoring the cache per
    /// `use_cache`/`force_refresh`.
    ///
    /// - `use_cache = true, force_refresh = false`: a readable cache file
    ///   short-circuits the HTTP request.
    /// - Otherwise: always fetch over HTTP; a successful fetch is written
    ///   back to the cache on a best-effort basis (write failures are not
    ///   fatal to the request).
    pub async fn fetch_raw(
        &self,
        url: &str,
        use_cache: bool,
        force_refresh: bool,
    ) -> Result<String> {
        let path = self.cache_path(url);

        if use_cache && !force_refresh {
            if let Ok(text) = tokio::fs::read_to_string(&path).await {
                trace!(%url, "metadata cache hit");
                return Ok(text);
            }
        }

        debug!(%url, "fetching metadata");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(format!("failed to GET {url}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::network(format!("HTTP {status} for {url}")));
        }

        let text = resp
            .text()
            .await
            .map_err(|e| Error::network(format!("failed to read response body for {url}: {e}")))?;

        // Validate it is JSON before caching or returning (spec.md §4.2:
        // "JSON parse failures are fatal for the request").
        sonic_rs::from_str::<sonic_rs::Value>(&text)
            .map_err(|e| Error::decode(format!("invalid JSON at {url}: {e}")))?;

        if use_cache {
            if let Err(e) = self.write_cache(&path, &text).await {
                warn!(%url, error = %e, "failed to write metadata cache entry (non-fatal)");
            }
        }

        Ok(text)
    }

    async fn write_cache(&self, path: &Path, text: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, text).await?;
        Ok(())
    }

    /// Fetch and deserialize a JSON document at `url`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        use_cache: bool,
        force_refresh: bool,
    ) -> Result<T> {
        let text = self.fetch_raw(url, use_cache, force_refresh).await?;
        sonic_rs::from_str(&text).map_err(Error::from)
    }

    /// Recursively delete the `cache/` tree, tolerant of it not existing.
    pub async fn purge(&self) -> Result<()> {
        match tokio::fs::remove_dir_all(&self.cache_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();
        let url = format!("{}/pkg.json", server.uri());

        let text = cache.fetch_raw(&url, true, false).await.unwrap();
        let v1: sonic_rs::Value = sonic_rs::from_str(&text).unwrap();
        assert_eq!(v1["a"].as_i64(), Some(1));

        // Second call must be served from cache: wiremock's `expect(1)`
        // fails verification on drop if a second request is made.
        let _ = cache.fetch_raw(&url, true, false).await.unwrap();
    }

    #[tokio::test]
    async fn force_refresh_bypasses_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pkg.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"a":1}"#))
            .expect(2)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();
        let url = format!("{}/pkg.json", server.uri());

        cache.fetch_raw(&url, true, false).await.unwrap();
        cache.fetch_raw(&url, true, true).await.unwrap();
    }

    #[tokio::test]
    async fn non_200_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();
        let url = format!("{}/missing.json", server.uri());

        let err = cache.fetch_raw(&url, true, false).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bad.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = MetadataCache::new(dir.path()).unwrap();
        let url = format!("{}/bad.json", server.uri());

        let err = cache.fetch_raw(&url, true, false).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn purge_tolerates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cache_dir = dir.path().join("does-not-exist");
        let cache = MetadataCache::new(&cache_dir).unwrap();
        cache.purge().await.unwrap();
    }
}
