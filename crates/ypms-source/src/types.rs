//! Flat, dotted-key document shapes served by sources (`spec.md` §3, §6).

use std::collections::HashMap;

use serde::Deserialize;
use ypms_core::RawDepEntry;

/// The repo descriptor fetched from a source's config URL.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoConfig {
    #[serde(rename = "ypms.repo.id")]
    pub id: String,
    #[serde(rename = "ypms.repo.name")]
    pub name: String,
    #[serde(rename = "ypms.repo.desc")]
    pub desc: Option<String>,
    #[serde(rename = "ypms.repo.url")]
    pub base_url: String,
    #[serde(rename = "ypms.repo.path.index")]
    pub path_index: String,
    #[serde(rename = "ypms.repo.path.package")]
    pub path_package: String,
}

impl RepoConfig {
    /// `base_url` with any trailing slash stripped, per `spec.md` §3.
    #[must_use]
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// A package info document: keyed by package ref within a source.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageInfo {
    #[serde(rename = "package.release.url")]
    pub release_url: String,
    #[serde(rename = "package.release.default")]
    #[serde(default)]
    pub release_default: Option<String>,
    #[serde(rename = "package.release.alias")]
    #[serde(default)]
    pub release_alias: HashMap<String, String>,
    #[serde(rename = "package.release.list")]
    #[serde(default)]
    pub release_list: Vec<String>,
}

/// A release info document for one concrete release.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseInfo {
    #[serde(rename = "release.depends")]
    #[serde(default)]
    pub depends: Vec<RawDepEntry>,
    #[serde(rename = "release.guides")]
    #[serde(default)]
    pub guides: HashMap<String, ypms_guide::Guide>,
}

impl ReleaseInfo {
    /// The named guide, if this release declares one.
    #[must_use]
    pub fn guide(&self, name: &str) -> Option<&ypms_guide::Guide> {
        self.guides.get(name)
    }
}
