//! `install-package` / `uninstall-package` steps (`spec.md` §4.4).
//!
//! `content` is a single dependency entry or a list of entries. Each entry
//! is the same shape a `release.depends` entry takes: a bare/extended ref
//! string or `{source?, package, version?}`.

use ypms_core::{Error, Result, SubstitutionContext};

use crate::effects::Effects;

/// Entries in `content` may be raw strings or `{source?, package, version?}`
/// objects; both forms reduce to the same dependency-entry string syntax
/// `ypms_core::DepEntry::parse_str` understands, so we just need to turn
/// each entry back into that string form.
fn entry_to_raw(entry: &sonic_rs::Value) -> Result<String> {
    if let Some(s) = entry.as_str() {
        return Ok(s.to_string());
    }
    if entry.is_object() {
        let package = entry
            .get("package")
            .and_then(|v| v.as_str())
            .ok_or_else(|| Error::validation("dependency entry object needs `package`"))?;
        let mut raw = String::new();
        if let Some(source) = entry.get("source").and_then(|v| v.as_str()) {
            raw.push_str(source);
            raw.push(':');
        }
        raw.push_str(package);
        if let Some(version) = entry.get("version").and_then(|v| v.as_str()) {
            raw.push('@');
            raw.push_str(version);
        }
        return Ok(raw);
    }
    Err(Error::validation(
        "dependency entry must be a string or object",
    ))
}

fn entries_from(content: &sonic_rs::Value) -> Result<Vec<String>> {
    if let Some(arr) = content.as_array() {
        return arr.iter().map(entry_to_raw).collect();
    }
    Ok(vec![entry_to_raw(content)?])
}

pub async fn install_package(
    content: &sonic_rs::Value,
    ctx: &SubstitutionContext,
    env: &str,
    effects: &mut dyn Effects,
) -> Result<String> {
    let entries = entries_from(content)?;
    let mut installed = Vec::with_capacity(entries.len());

    for raw in entries {
        let dep_raw = ctx.apply(&raw);
        if effects.is_installed(env, &dep_raw).await? {
            continue;
        }
        effects.install_dependency(env, &dep_raw).await?;
        installed.push(dep_raw);
    }

    Ok(format!("installed [{}] into {env}", installed.join(", ")))
}

pub async fn uninstall_package(
    content: &sonic_rs::Value,
    ctx: &SubstitutionContext,
    env: &str,
    effects: &mut dyn Effects,
    force: bool,
) -> Result<String> {
    let entries = entries_from(content)?;
    let mut uninstalled = Vec::with_capacity(entries.len());

    for raw in entries {
        let package_ref = ctx.apply(&raw);
        effects.uninstall_dependency(env, &package_ref, force).await?;
        uninstalled.push(package_ref);
    }

    Ok(format!("uninstalled [{}] from {env}", uninstalled.join(", ")))
}
