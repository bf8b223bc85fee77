//! A single configured source: repo config plus the three metadata fetches
//! and release-tag resolution (`spec.md` §4.3).

use tracing::debug;
use ypms_cache::MetadataCache;
use ypms_core::{Error, Result};

use crate::types::{PackageInfo, ReleaseInfo, RepoConfig};

/// One configured, resolved source. Lazily constructed and cached by name
/// (see [`crate::SourceRegistry`]); holds a parsed repo config and shares
/// the manager's metadata cache.
#[derive(Debug, Clone)]
pub struct Source {
    name: String,
    config: RepoConfig,
    cache: MetadataCache,
}

impl Source {
    /// Fetch and parse `config_url`'s repo descriptor. Missing required
    /// keys surface as a decode error (serde rejects the document).
    pub async fn new(name: impl Into<String>, config_url: &str, cache: MetadataCache, force_refresh: bool) -> Result<Self> {
        let config: RepoConfig = cache
            .fetch_json(config_url, true, force_refresh)
            .await
            .map_err(|e| Error::decode(format!("invalid repo descriptor at {config_url}: {e}")))?;
        Ok(Self {
            name: name.into(),
            config,
            cache,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    /// GET `base_url + path_index`.
    pub async fn fetch_index(&self, force_refresh: bool) -> Result<sonic_rs::Value> {
        let url = format!("{}{}", self.config.base_url_trimmed(), self.config.path_index);
        self.cache.fetch_json(&url, true, force_refresh).await
    }

    /// GET `base_url + path_package` after `{USER_ID}`/`{PACKAGE_ID}` substitution.
    pub async fn fetch_package_info(
        &self,
        user: &str,
        package: &str,
        force_refresh: bool,
    ) -> Result<PackageInfo> {
        let path = self
            .config
            .path_package
            .replace("{USER_ID}", user)
            .replace("{PACKAGE_ID}", package);
        let url = format!("{}{}", self.config.base_url_trimmed(), path);
        self.cache.fetch_json(&url, true, force_refresh).await
    }

    /// `spec.md` §4.3's four-step resolution: explicit tag, else
    /// `package.release.default`, else `alias["latest"]`, else
    /// `list.first()`; then apply one level of aliasing.
    #[must_use]
    pub fn resolve_release_tag(pkg_info: &PackageInfo, tag: Option<&str>) -> Option<String> {
        let mut tag = tag.filter(|t| !t.is_empty()).map(ToString::to_string);
        if tag.is_none() {
            tag = pkg_info.release_default.clone().filter(|t| !t.is_empty());
        }
        if tag.is_none() {
            tag = pkg_info.release_alias.get("latest").cloned();
        }
        if tag.is_none() {
            tag = pkg_info.release_list.first().cloned();
        }
        let tag = tag?;
        let resolved = pkg_info.release_alias.get(&tag).cloned().unwrap_or_else(|| tag.clone());
        debug!(requested = ?tag, resolved, "resolved release tag");
        Some(resolved)
    }

    /// GET `package.release.url` with `{RELEASE_ID}` substituted.
    pub async fn fetch_release_info(
        &self,
        pkg_info: &PackageInfo,
        release_id: &str,
        force_refresh: bool,
    ) -> Result<ReleaseInfo> {
        let url = pkg_info.release_url.replace("{RELEASE_ID}", release_id);
        self.cache.fetch_json(&url, true, force_refresh).await
    }
}
