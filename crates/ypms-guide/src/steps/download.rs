//! `download-file` / `download-only` steps (`spec.md` §4.4).
//!
//! Both fetch `content.url` into `{YPMS_ENV_DIR}/content.dest` (both
//! template-substituted); they share the same `{url, dest}` content shape
//! and only differ in name.

use std::path::Path;

use ypms_core::{Result, SubstitutionContext};

use crate::content;

async fn download(
    client: &reqwest::Client,
    content: &sonic_rs::Value,
    env_dir: &Path,
    ctx: &SubstitutionContext,
    step_type: &str,
) -> Result<String> {
    let url = ctx.apply(content::field_str(content, "url", step_type)?);
    let dest_raw = content::field_str(content, "dest", step_type)?;
    let dest = env_dir.join(ctx.apply(dest_raw));

    ypms_cache::download_file(client, &url, &dest).await?;
    Ok(dest.display().to_string())
}

pub async fn download_file(
    client: &reqwest::Client,
    content: &sonic_rs::Value,
    env_dir: &Path,
    ctx: &SubstitutionContext,
) -> Result<String> {
    download(client, content, env_dir, ctx, "download-file").await
}

pub async fn download_only(
    client: &reqwest::Client,
    content: &sonic_rs::Value,
    env_dir: &Path,
    ctx: &SubstitutionContext,
) -> Result<String> {
    download(client, content, env_dir, ctx, "download-only").await
}
