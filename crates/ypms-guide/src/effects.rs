//! Reentry seam back into the manager (`spec.md` §9: "avoid a cyclic
//! dependency between the guide engine and the manager facade").
//!
//! `ypms-guide` cannot depend on `ypms-manager` (the manager depends on
//! `ypms-guide` to execute guides), so `install-package`, `uninstall-package`,
//! `add-repo` and `remove-repo` steps call back through this trait instead.
//! `ypms-manager::Manager` is the production implementation.

use async_trait::async_trait;
use ypms_core::Result;

/// Operations a guide step may trigger against the rest of the system.
#[async_trait]
pub trait Effects: Send {
    /// Is `user/package` already installed into `env`?
    async fn is_installed(&mut self, env: &str, package_ref: &str) -> Result<bool>;

    /// Resolve and install `package_ref` (optionally pinned `@version`) into
    /// `env`, recursing through its own guide the same way a top-level
    /// `install` would.
    async fn install_dependency(&mut self, env: &str, dep_raw: &str) -> Result<()>;

    /// Remove `package_ref` from `env`'s ledger and run its `uninstall` guide.
    /// `force` proceeds past any remaining dependents instead of blocking.
    async fn uninstall_dependency(&mut self, env: &str, package_ref: &str, force: bool) -> Result<()>;

    /// Register `name` pointing at `url` in `sources.json`, if not already present.
    async fn add_repo(&mut self, name: &str, url: &str) -> Result<()>;

    /// Remove `name` from `sources.json`.
    async fn remove_repo(&mut self, name: &str) -> Result<()>;

    /// Is a source named `name` currently configured?
    async fn has_repo(&mut self, name: &str) -> Result<bool>;
}
