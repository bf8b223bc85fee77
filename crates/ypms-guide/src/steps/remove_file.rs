//! `remove-file` step (`spec.md` §4.4).
//!
//! `content` is a path string, a list of paths, or `{path|paths, missing_ok?:
//! bool=true}`. Missing entries are tolerated unless `missing_ok=false`.
//! Directories are removed recursively; the core never follows symlinks, it
//! only unlinks the link entry itself.

use std::path::Path;

use ypms_core::{Error, Result, SubstitutionContext};

fn paths_from(content: &sonic_rs::Value) -> Result<(Vec<String>, bool)> {
    if let Some(s) = content.as_str() {
        return Ok((vec![s.to_string()], true));
    }
    if let Some(arr) = content.as_array() {
        let paths = arr
            .iter()
            .map(|v| {
                v.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Error::validation("remove-file list entries must be strings"))
            })
            .collect::<Result<Vec<_>>>()?;
        return Ok((paths, true));
    }
    if content.is_object() {
        let missing_ok = content.get("missing_ok").and_then(|v| v.as_bool()).unwrap_or(true);
        if let Some(single) = content.get("path").and_then(|v| v.as_str()) {
            return Ok((vec![single.to_string()], missing_ok));
        }
        if let Some(arr) = content.get("paths").and_then(|v| v.as_array()) {
            let paths = arr
                .iter()
                .map(|v| {
                    v.as_str()
                        .map(ToString::to_string)
                        .ok_or_else(|| Error::validation("remove-file paths entries must be strings"))
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok((paths, missing_ok));
        }
        return Err(Error::validation(
            "remove-file object content needs `path` or `paths`",
        ));
    }
    Err(Error::validation(
        "remove-file content must be a string, list, or object",
    ))
}

pub async fn remove_file(
    content: &sonic_rs::Value,
    env_dir: &Path,
    ctx: &SubstitutionContext,
) -> Result<String> {
    let (raw_paths, missing_ok) = paths_from(content)?;
    let mut removed = 0usize;

    for raw in raw_paths {
        let target = env_dir.join(ctx.apply(&raw));
        match tokio::fs::symlink_metadata(&target).await {
            Ok(meta) if meta.is_dir() => {
                tokio::fs::remove_dir_all(&target).await?;
                removed += 1;
            }
            Ok(_) => {
                tokio::fs::remove_file(&target).await?;
                removed += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if !missing_ok {
                    return Err(Error::filesystem(format!(
                        "{} does not exist and missing_ok is false",
                        target.display()
                    )));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(format!("removed={removed}"))
}
