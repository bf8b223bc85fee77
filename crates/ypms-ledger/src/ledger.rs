//! The installed-package ledger: load-mutate-save-in-full around
//! `installed.json` (`spec.md` §4.6).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use ypms_core::{json, Result};

use crate::atomic::write_json_atomic;
use crate::types::{ledger_key, LedgerDoc, Record};

/// Owns the loaded `installed.json` document and persists it back on every
/// mutation. One instance is expected to live for the lifetime of a single
/// command (`spec.md` §3 "Ownership/lifecycle").
#[derive(Debug)]
pub struct InstalledLedger {
    path: PathBuf,
    doc: LedgerDoc,
}

impl InstalledLedger {
    /// Load `path`, or seed an empty `{"envs": {}}` document if it doesn't
    /// exist yet.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match tokio::fs::read_to_string(&path).await {
            Ok(text) => json::from_json(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerDoc::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, doc })
    }

    async fn persist(&self) -> Result<()> {
        write_json_atomic(&self.path, &self.doc).await
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `is_installed(env, source, ref)`.
    #[must_use]
    pub fn is_installed(&self, env: &str, source: &str, package_ref: &str) -> bool {
        self.doc
            .envs
            .get(env)
            .is_some_and(|recs| recs.contains_key(&ledger_key(source, package_ref)))
    }

    /// The record for `(env, source, ref)`, if installed.
    #[must_use]
    pub fn record(&self, env: &str, source: &str, package_ref: &str) -> Option<&Record> {
        self.doc.envs.get(env)?.get(&ledger_key(source, package_ref))
    }

    /// `mark_installed(env, source, ref, version, explicit)`: upsert,
    /// `installed_at` set to current UTC, persisted immediately.
    pub async fn mark_installed(
        &mut self,
        env: &str,
        source: &str,
        package_ref: &str,
        version: &str,
        explicit: bool,
    ) -> Result<()> {
        let key = ledger_key(source, package_ref);
        let record = Record {
            source: source.to_string(),
            package: package_ref.to_string(),
            version: version.to_string(),
            explicit,
            installed_at: Utc::now().to_rfc3339(),
        };
        self.doc.envs.entry(env.to_string()).or_default().insert(key, record);
        self.persist().await
    }

    /// `mark_uninstalled(env, source, ref)`: delete if present, absence is
    /// not an error, persisted immediately.
    pub async fn mark_uninstalled(&mut self, env: &str, source: &str, package_ref: &str) -> Result<()> {
        let key = ledger_key(source, package_ref);
        if let Some(recs) = self.doc.envs.get_mut(env) {
            recs.remove(&key);
        }
        self.persist().await
    }

    /// `list_installed(env?)`: `{env: {key: record}}`, scoped to one env if given.
    #[must_use]
    pub fn list_installed(&self, env: Option<&str>) -> BTreeMap<String, BTreeMap<String, Record>> {
        match env {
            Some(env) => self
                .doc
                .envs
                .get(env)
                .map(|recs| BTreeMap::from([(env.to_string(), recs.clone())]))
                .unwrap_or_default(),
            None => self.doc.envs.clone(),
        }
    }

    /// All records for one env, keyed by ledger key.
    #[must_use]
    pub fn env_records(&self, env: &str) -> BTreeMap<String, Record> {
        self.doc.envs.get(env).cloned().unwrap_or_default()
    }
}
