//! `sources.json`: `name -> config_url`, insertion order preserved so
//! `add`/`remove` round-trips byte-identically modulo key order
//! (`spec.md` §8).

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use ypms_core::{json, Error, Result};

use crate::layout::{DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL};

/// The loaded `sources.json` document, persisted in full on every mutation.
#[derive(Debug)]
pub struct SourcesFile {
    path: PathBuf,
    map: IndexMap<String, String>,
}

impl SourcesFile {
    /// Load `path`, seeding `{yopr: DEFAULT_SOURCE_URL}` if it doesn't exist.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let map = match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let map: IndexMap<String, String> = json::from_json(&text)?;
                map
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut map = IndexMap::new();
                map.insert(DEFAULT_SOURCE_NAME.to_string(), DEFAULT_SOURCE_URL.to_string());
                let file = Self { path: path.clone(), map };
                file.persist().await?;
                return Ok(file);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, map })
    }

    async fn persist(&self) -> Result<()> {
        if let Some(parent) = Path::new(&self.path).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = json::to_json_pretty(&self.map)?;
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, text).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// `{name: config_url}`, in insertion order.
    #[must_use]
    pub fn list(&self) -> &IndexMap<String, String> {
        &self.map
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(name).map(String::as_str)
    }

    pub async fn add(&mut self, name: impl Into<String>, config_url: impl Into<String>) -> Result<()> {
        self.map.insert(name.into(), config_url.into());
        self.persist().await
    }

    pub async fn remove(&mut self, name: &str) -> Result<()> {
        self.map.shift_remove(name);
        self.persist().await
    }

    /// Default source selection (`spec.md` §4.5): prefer `yopr`, else the
    /// lexicographically smallest name, else `NotConfigured`.
    pub fn default_source(&self) -> Result<&str> {
        if self.map.contains_key(DEFAULT_SOURCE_NAME) {
            return Ok(DEFAULT_SOURCE_NAME);
        }
        self.map
            .keys()
            .min()
            .map(String::as_str)
            .ok_or_else(|| Error::not_configured("no sources configured"))
    }

    /// Resolve `source` or fall back to [`Self::default_source`], returning
    /// the selected name and its config URL.
    pub fn resolve<'a>(&'a self, source: Option<&'a str>) -> Result<(&'a str, &'a str)> {
        let name = match source {
            Some(name) => name,
            None => self.default_source()?,
        };
        let url = self
            .get(name)
            .ok_or_else(|| Error::not_configured(format!("unknown source: {name}")))?;
        Ok((name, url))
    }
}
