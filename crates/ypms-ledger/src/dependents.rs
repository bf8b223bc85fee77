//! Dependents lookup and update-compatibility checks (`spec.md` §4.6).

use std::collections::HashMap;

use ypms_core::{DepEntry, Error, PackageRef, Result};
use ypms_source::{Source, SourceRegistry};

use crate::ledger::InstalledLedger;

/// One package that depends on a given target, per `spec.md` §4.6.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub dependent_source: String,
    pub dependent_package: String,
    pub dependent_version: String,
    /// Alias-resolved tag the dependent pinned the target to, empty if the
    /// dep entry omitted a version.
    pub required_version: String,
}

/// `find_dependents(env, target_source, target_ref)`: every ledger record in
/// `env` whose release depends on `(target_source, target_ref)`.
pub async fn find_dependents(
    ledger: &InstalledLedger,
    env: &str,
    target_source: &str,
    target_ref: &str,
    sources: &HashMap<String, String>,
    registry: &mut SourceRegistry,
    cache: &ypms_cache::MetadataCache,
) -> Result<Vec<Dependent>> {
    let target_config_url = sources
        .get(target_source)
        .ok_or_else(|| Error::not_configured(format!("source {target_source} is not configured")))?;
    let target_parsed = PackageRef::parse(target_ref)?;
    let target_source_obj = registry
        .get_or_init(target_source, target_config_url, cache, false)
        .await?
        .clone();
    let target_pkg_info = target_source_obj
        .fetch_package_info(&target_parsed.user, &target_parsed.package, false)
        .await?;

    let mut dependents = Vec::new();

    for (_key, record) in ledger.env_records(env) {
        let Some(config_url) = sources.get(&record.source) else {
            tracing::warn!(source = %record.source, "skipping ledger record from an unconfigured source");
            continue;
        };
        let source = registry
            .get_or_init(&record.source, config_url, cache, false)
            .await?
            .clone();
        let parsed = PackageRef::parse(&record.package)?;
        let pkg_info = source
            .fetch_package_info(&parsed.user, &parsed.package, false)
            .await?;
        let release_info = source
            .fetch_release_info(&pkg_info, &record.version, false)
            .await?;

        for raw in &release_info.depends {
            let dep = DepEntry::from_raw(raw)?;
            let dep_source = dep.source.clone().unwrap_or_else(|| record.source.clone());
            let dep_ref = dep.package.to_string();
            if dep_source != target_source || dep_ref != target_ref {
                continue;
            }
            let required_version = match dep.version.as_deref() {
                None => String::new(),
                Some(tag) => Source::resolve_release_tag(&target_pkg_info, Some(tag)).unwrap_or_default(),
            };
            dependents.push(Dependent {
                dependent_source: record.source.clone(),
                dependent_package: record.package.clone(),
                dependent_version: record.version.clone(),
                required_version,
            });
        }
    }

    Ok(dependents)
}

/// `check_update_compat(env, target_source, target_ref, new_version)`:
/// blocker messages for every dependent that pinned an incompatible
/// version. A dependent blocks iff it specified a non-empty
/// `required_version` that is neither `latest` nor `*` nor `new_version`.
pub async fn check_update_compat(
    ledger: &InstalledLedger,
    env: &str,
    target_source: &str,
    target_ref: &str,
    new_version: &str,
    sources: &HashMap<String, String>,
    registry: &mut SourceRegistry,
    cache: &ypms_cache::MetadataCache,
) -> Result<Vec<String>> {
    let dependents = find_dependents(ledger, env, target_source, target_ref, sources, registry, cache).await?;
    Ok(dependents
        .into_iter()
        .filter(|d| !d.required_version.is_empty() && d.required_version != "latest" && d.required_version != "*")
        .filter(|d| d.required_version != new_version)
        .map(|d| {
            format!(
                "{} requires {target_source}:{target_ref}@{}, but update targets {new_version}",
                d.dependent_package, d.required_version
            )
        })
        .collect())
}
