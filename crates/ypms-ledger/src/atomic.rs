//! Write-temp-then-rename durability for the single-file JSON stores
//! (`spec.md` §9: "use atomic write-and-rename for durability; do not
//! assume cross-process safety").

use std::path::Path;

use ypms_core::Result;

pub async fn write_json_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let text = ypms_core::json::to_json_pretty(value)?;
    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, text).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
