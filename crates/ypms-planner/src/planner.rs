//! `plan_install` (`spec.md` §4.7).

use std::collections::HashMap;

use ypms_cache::MetadataCache;
use ypms_core::{DepEntry, Error, PackageRef, Result};
use ypms_ledger::InstalledLedger;
use ypms_source::{Source, SourceRegistry};

use crate::types::{Operation, OperationKind, Plan};

/// Build an install plan for `root_ref` (already resolved to a source name
/// by the caller — see `spec.md` §4.5 default-source selection) at an
/// optional explicit `root_version`, against `env`.
#[allow(clippy::too_many_arguments)]
pub async fn plan_install(
    ledger: &InstalledLedger,
    env: &str,
    root_source: &str,
    root_ref: &str,
    root_version: Option<&str>,
    sources: &HashMap<String, String>,
    registry: &mut SourceRegistry,
    cache: &MetadataCache,
) -> Result<Plan> {
    let root_parsed = PackageRef::parse(root_ref)?;
    let root_config_url = sources
        .get(root_source)
        .ok_or_else(|| Error::not_configured(format!("source {root_source} is not configured")))?;
    let root_src = registry
        .get_or_init(root_source, root_config_url, cache, false)
        .await?
        .clone();
    let root_pkg_info = root_src
        .fetch_package_info(&root_parsed.user, &root_parsed.package, false)
        .await?;
    let resolved_version = Source::resolve_release_tag(&root_pkg_info, root_version)
        .ok_or_else(|| Error::decode(format!("no release tag could be resolved for {root_ref}")))?;
    let root_release_info = root_src
        .fetch_release_info(&root_pkg_info, &resolved_version, false)
        .await?;

    // Pass 1: resolve every dep whose source is already configured, and
    // collect the repo names their own `install` guide would add (these are
    // the "providers" a not-yet-configured dep's source might come from).
    struct ResolvedDep {
        raw_source: Option<String>,
        source: String,
        package_ref: String,
        version: Option<String>,
    }

    let mut providers: HashMap<String, String> = HashMap::new();
    let mut resolved_deps = Vec::with_capacity(root_release_info.depends.len());

    for raw in &root_release_info.depends {
        let dep = DepEntry::from_raw(raw)?;
        let dep_source = dep.source.clone().unwrap_or_else(|| root_source.to_string());
        let dep_ref = dep.package.to_string();

        let version = if let Some(config_url) = sources.get(&dep_source) {
            let src = registry
                .get_or_init(&dep_source, config_url, cache, false)
                .await?
                .clone();
            let pkg_info = src
                .fetch_package_info(&dep.package.user, &dep.package.package, false)
                .await?;
            let version = Source::resolve_release_tag(&pkg_info, dep.version.as_deref())
                .ok_or_else(|| Error::decode(format!("no release tag could be resolved for {dep_ref}")))?;
            let release_info = src.fetch_release_info(&pkg_info, &version, false).await?;
            if let Some(install_guide) = release_info.guide("install") {
                for name in install_guide.predicted_repo_names() {
                    providers.insert(name, format!("{dep_ref}@{version}"));
                }
            }
            Some(version)
        } else {
            None
        };

        resolved_deps.push(ResolvedDep {
            raw_source: dep.source.clone(),
            source: dep_source,
            package_ref: dep_ref,
            version,
        });
    }

    // Pass 2: emit one operation per dep, in declared order.
    let mut operations = Vec::with_capacity(resolved_deps.len() + 1);
    for dep in resolved_deps {
        let already_configured = sources.contains_key(&dep.source);
        let footnote = if !already_configured {
            providers.get(&dep.source).map(|provider| format!("*{provider}"))
        } else {
            None
        };

        if !already_configured && footnote.is_none() {
            return Err(Error::not_configured(format!(
                "dependency source {} is not configured and no upcoming install provides it",
                dep.source
            )));
        }

        let version = dep.version.unwrap_or_default();
        let kind = if ledger.is_installed(env, &dep.source, &dep.package_ref) {
            OperationKind::Update
        } else {
            OperationKind::Install
        };

        tracing::trace!(
            source = %dep.source,
            raw_source = ?dep.raw_source,
            package_ref = %dep.package_ref,
            "planned dependency operation"
        );

        operations.push(Operation {
            kind,
            source: dep.source,
            package_ref: dep.package_ref,
            version,
            footnote,
        });
    }

    // Root op.
    let root_kind = match ledger.record(env, root_source, root_ref) {
        Some(record) if record.version == resolved_version => OperationKind::Noop,
        Some(_) => OperationKind::Update,
        None => OperationKind::Target,
    };
    operations.push(Operation {
        kind: root_kind,
        source: root_source.to_string(),
        package_ref: root_ref.to_string(),
        version: resolved_version,
        footnote: None,
    });

    Ok(Plan { operations })
}
