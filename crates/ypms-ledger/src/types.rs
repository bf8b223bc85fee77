//! `installed.json` document shape (`spec.md` §3, §6).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One installed package record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub source: String,
    pub package: String,
    pub version: String,
    pub explicit: bool,
    pub installed_at: String,
}

/// The full `installed.json` document: `{"envs": {env_id: {key: record}}}`.
/// `BTreeMap` keeps key order stable across save/load, which matters for the
/// round-trip property in `spec.md` §8.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerDoc {
    #[serde(default)]
    pub envs: BTreeMap<String, BTreeMap<String, Record>>,
}

/// `"<source_name>:<user>/<package>"`, the canonical ledger key
/// (`spec.md` §9 open question (a): colon form is canonical).
#[must_use]
pub fn ledger_key(source: &str, package_ref: &str) -> String {
    format!("{source}:{package_ref}")
}
