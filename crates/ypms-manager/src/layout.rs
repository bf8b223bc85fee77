//! On-disk directory layout under `YPMS_DIR` (`spec.md` §6), grounded in
//! `libretto-config::env::EnvConfig`'s environment-driven resolution style.

use std::path::PathBuf;

/// Default source seeded into a fresh `sources.json` (`spec.md` §3, §4.5).
pub const DEFAULT_SOURCE_NAME: &str = "yopr";
/// Carried over verbatim from the Python reference implementation.
pub const DEFAULT_SOURCE_URL: &str = "https://ypsh-dgc.github.io/YPMS/yopr/ypms.json";

/// Resolved paths for one manager instance.
#[derive(Debug, Clone)]
pub struct Layout {
    pub ypms_dir: PathBuf,
    pub envs_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub sources_path: PathBuf,
    pub installed_path: PathBuf,
}

impl Layout {
    /// Resolve from `YPMS_DIR`/`YPMS_ENVS_DIR`, falling back to `~/.ypms`.
    #[must_use]
    pub fn from_env() -> Self {
        let ypms_dir = std::env::var_os("YPMS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_ypms_dir);
        let envs_dir = std::env::var_os("YPMS_ENVS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| ypms_dir.join("envs"));
        let cache_dir = ypms_dir.join("cache");
        let sources_path = ypms_dir.join("sources.json");
        let installed_path = ypms_dir.join("installed.json");
        Self {
            ypms_dir,
            envs_dir,
            cache_dir,
            sources_path,
            installed_path,
        }
    }

    /// Derive a layout rooted directly at `ypms_dir`, ignoring the
    /// environment. Used by tests and anything else that wants an isolated
    /// directory tree without mutating `YPMS_DIR`/`YPMS_ENVS_DIR`.
    #[must_use]
    pub fn under(ypms_dir: impl Into<PathBuf>) -> Self {
        let ypms_dir = ypms_dir.into();
        let envs_dir = ypms_dir.join("envs");
        let cache_dir = ypms_dir.join("cache");
        let sources_path = ypms_dir.join("sources.json");
        let installed_path = ypms_dir.join("installed.json");
        Self {
            ypms_dir,
            envs_dir,
            cache_dir,
            sources_path,
            installed_path,
        }
    }

    /// Ensure `ypms_dir`, `envs/`, and `cache/` exist.
    pub async fn ensure(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.ypms_dir).await?;
        tokio::fs::create_dir_all(&self.envs_dir).await?;
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        Ok(())
    }

    /// `envs/<env_id>`, created on demand by callers that write into it.
    #[must_use]
    pub fn env_dir(&self, env: &str) -> PathBuf {
        self.envs_dir.join(env)
    }
}

fn default_ypms_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".ypms"))
        .unwrap_or_else(|| PathBuf::from(".ypms"))
}

/// `YPMS_DEBUG=1` is equivalent to `-v -v` (`spec.md` §6, `SPEC_FULL.md` §3).
#[must_use]
pub fn debug_env_enabled() -> bool {
    std::env::var("YPMS_DEBUG").is_ok_and(|v| v == "1")
}
