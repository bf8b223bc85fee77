//! `Manager`: the six top-level operations over sources, envs, and the
//! installed ledger (`spec.md` §4.5).

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};
use ypms_cache::MetadataCache;
use ypms_core::{DepEntry, Error, PackageRef, Result, SubstitutionContext};
use ypms_guide::Effects;
use ypms_ledger::{check_update_compat, find_dependents, InstalledLedger};
use ypms_planner::{plan_install, OperationKind, Plan};
use ypms_platform::{host_arch, host_os};
use ypms_source::{Source, SourceRegistry};

use crate::layout::Layout;
use crate::sources::SourcesFile;

/// Owns every shared resource for one command invocation (`spec.md` §3
/// "Ownership/lifecycle"): the sources map, the installed ledger, the HTTP
/// metadata cache, and a fresh resolver cache.
pub struct Manager {
    layout: Layout,
    sources: SourcesFile,
    ledger: InstalledLedger,
    cache: MetadataCache,
    registry: SourceRegistry,
    /// The source the guide currently executing belongs to, used as the
    /// default when a reentrant dependency entry omits a source override.
    current_source: Option<String>,
}

impl Manager {
    /// Resolve the layout from the environment, ensure its directories
    /// exist, and load `sources.json`/`installed.json`.
    pub async fn new() -> Result<Self> {
        Self::with_layout(Layout::from_env()).await
    }

    /// Like [`Self::new`], but against an explicit [`Layout`] rather than
    /// one resolved from the process environment — lets tests and
    /// `ypms-cli` construct one directly instead of racing `YPMS_DIR`
    /// across parallel test threads.
    pub async fn with_layout(layout: Layout) -> Result<Self> {
        layout.ensure().await?;
        let sources = SourcesFile::load(&layout.sources_path).await?;
        let ledger = InstalledLedger::load(&layout.installed_path).await?;
        let cache = MetadataCache::new(&layout.cache_dir)?;
        Ok(Self {
            layout,
            sources,
            ledger,
            cache,
            registry: SourceRegistry::new(),
            current_source: None,
        })
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn sources(&self) -> &SourcesFile {
        &self.sources
    }

    /// The ledger record for `(env, source, ref)`, if installed.
    #[must_use]
    pub fn ledger_record(&self, env: &str, source: &str, package_ref: &str) -> Option<&ypms_ledger::Record> {
        self.ledger.record(env, source, package_ref)
    }

    pub async fn add_source(&mut self, name: &str, config_url: &str) -> Result<()> {
        self.sources.add(name, config_url).await
    }

    pub async fn remove_source(&mut self, name: &str) -> Result<()> {
        self.sources.remove(name).await
    }

    /// `list_envs()`: every directory directly under `envs/`.
    pub async fn list_envs(&self) -> Result<Vec<String>> {
        let mut envs = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.layout.envs_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(envs),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    envs.push(name.to_string());
                }
            }
        }
        envs.sort();
        Ok(envs)
    }

    /// `list_packages(source?)`: the index document from the selected source.
    pub async fn list_packages(&mut self, source: Option<&str>) -> Result<sonic_rs::Value> {
        let source = self.resolved_source(source).await?;
        source.fetch_index(false).await
    }

    /// `package_info(ref, source?)`: the package document annotated with
    /// `_source`/`_package_ref`, per `spec.md` §4.5.
    pub async fn package_info(&mut self, package_ref: &str, source: Option<&str>) -> Result<sonic_rs::Value> {
        let parsed = PackageRef::parse(package_ref)?;
        let source = self.resolved_source(source).await?;
        let config = source.config();
        let path = config
            .path_package
            .replace("{USER_ID}", &parsed.user)
            .replace("{PACKAGE_ID}", &parsed.package);
        let url = format!("{}{path}", config.base_url_trimmed());
        let mut doc: sonic_rs::Value = self.cache.fetch_json(&url, true, false).await?;
        if let Some(obj) = doc.as_object_mut() {
            obj.insert("_source", source.name().to_string());
            obj.insert("_package_ref", parsed.to_string());
        }
        Ok(doc)
    }

    async fn resolved_source(&mut self, source: Option<&str>) -> Result<Source> {
        let (name, url) = self.sources.resolve(source)?;
        let (name, url) = (name.to_string(), url.to_string());
        Ok(self.registry.get_or_init(&name, &url, &self.cache, false).await?.clone())
    }

    /// `install(ref, env, version?, source?, explicit, assume_yes, force)`:
    /// plan then execute, per `spec.md` §4.5/§4.7.
    #[allow(clippy::too_many_arguments)]
    pub async fn install(
        &mut self,
        package_ref: &str,
        env: &str,
        version: Option<&str>,
        source: Option<&str>,
        assume_yes: bool,
        force: bool,
    ) -> Result<PathBuf> {
        let (root_source, root_url) = self.sources.resolve(source)?;
        let (root_source, root_url) = (root_source.to_string(), root_url.to_string());

        // Best-effort index refresh: a source whose index is down shouldn't
        // block an install of a package whose package/release docs still work.
        if let Ok(src) = self.registry.get_or_init(&root_source, &root_url, &self.cache, true).await {
            let src = src.clone();
            if let Err(e) = src.fetch_index(true).await {
                warn!(source = %root_source, error = %e, "best-effort index refresh failed");
            }
        }

        let sources_map = self.sources_snapshot();
        let plan = plan_install(
            &self.ledger,
            env,
            &root_source,
            package_ref,
            version,
            &sources_map,
            &mut self.registry,
            &self.cache,
        )
        .await?;

        if plan.is_empty() {
            return Ok(self.layout.env_dir(env));
        }

        if !assume_yes {
            confirm_plan(&plan)?;
        }

        self.execute_plan(&plan, env, force).await?;
        Ok(self.layout.env_dir(env))
    }

    async fn execute_plan(&mut self, plan: &Plan, env: &str, force: bool) -> Result<()> {
        for op in &plan.operations {
            match op.kind {
                OperationKind::Noop => continue,
                OperationKind::Install => {
                    self.install_one(&op.source, &op.package_ref, Some(op.version.as_str()), env, false)
                        .await?;
                }
                OperationKind::Target => {
                    self.install_one(&op.source, &op.package_ref, Some(op.version.as_str()), env, true)
                        .await?;
                }
                OperationKind::Update => {
                    self.update_one(&op.source, &op.package_ref, &op.version, env, force).await?;
                }
            }
        }
        Ok(())
    }

    async fn install_one(
        &mut self,
        source: &str,
        package_ref: &str,
        version: Option<&str>,
        env: &str,
        explicit: bool,
    ) -> Result<PathBuf> {
        let (name, url) = self.sources.resolve(Some(source))?;
        let (name, url) = (name.to_string(), url.to_string());
        let src = self.registry.get_or_init(&name, &url, &self.cache, false).await?.clone();

        let parsed = PackageRef::parse(package_ref)?;
        let pkg_info = src.fetch_package_info(&parsed.user, &parsed.package, false).await?;
        let resolved_version = Source::resolve_release_tag(&pkg_info, version)
            .ok_or_else(|| Error::decode(format!("no release tag could be resolved for {package_ref}")))?;
        let release_info = src.fetch_release_info(&pkg_info, &resolved_version, false).await?;
        let guide = release_info
            .guide("install")
            .ok_or_else(|| Error::validation(format!("guide 'install' not defined for release '{resolved_version}'")))?;

        let env_dir = self.layout.env_dir(env);
        tokio::fs::create_dir_all(&env_dir).await?;
        let ctx = self.context_for(&env_dir, package_ref, &name, &resolved_version);

        info!(source = %name, %package_ref, version = %resolved_version, "installing");
        self.run_guide(guide, &env_dir, &ctx, &name, env, false).await?;
        self.ledger.mark_installed(env, &name, package_ref, &resolved_version, explicit).await?;
        Ok(env_dir)
    }

    async fn update_one(&mut self, source: &str, package_ref: &str, new_version: &str, env: &str, force: bool) -> Result<()> {
        let sources_map = self.sources_snapshot();
        let blockers = check_update_compat(
            &self.ledger,
            env,
            source,
            package_ref,
            new_version,
            &sources_map,
            &mut self.registry,
            &self.cache,
        )
        .await?;
        if !blockers.is_empty() {
            if !force {
                return Err(Error::dependency(blockers.join("; ")));
            }
            warn!(%package_ref, "updating despite dependent version pins (forced): {}", blockers.join("; "));
        }

        let (name, url) = self.sources.resolve(Some(source))?;
        let (name, url) = (name.to_string(), url.to_string());
        let src = self.registry.get_or_init(&name, &url, &self.cache, false).await?.clone();
        let parsed = PackageRef::parse(package_ref)?;
        let pkg_info = src.fetch_package_info(&parsed.user, &parsed.package, false).await?;
        let release_info = src.fetch_release_info(&pkg_info, new_version, false).await?;
        let guide = release_info
            .guide("update")
            .ok_or_else(|| Error::validation(format!("guide 'update' not defined for release '{new_version}'")))?;

        let env_dir = self.layout.env_dir(env);
        tokio::fs::create_dir_all(&env_dir).await?;
        let ctx = self.context_for(&env_dir, package_ref, &name, new_version);
        let explicit = self
            .ledger
            .record(env, &name, package_ref)
            .map_or(true, |r| r.explicit);

        self.run_guide(guide, &env_dir, &ctx, &name, env, force).await?;
        self.ledger.mark_installed(env, &name, package_ref, new_version, explicit).await?;
        Ok(())
    }

    /// `run(ref, guide_name, env, version?, source?, force, assume_yes)`.
    #[allow(clippy::too_many_arguments)]
    pub async fn run(
        &mut self,
        package_ref: &str,
        guide_name: &str,
        env: &str,
        version: Option<&str>,
        source: Option<&str>,
        force: bool,
        _assume_yes: bool,
    ) -> Result<String> {
        let (name, url) = self.sources.resolve(source)?;
        let (name, url) = (name.to_string(), url.to_string());

        if guide_name == "uninstall" {
            return self.run_uninstall(&name, package_ref, env, force).await;
        }

        let src = self.registry.get_or_init(&name, &url, &self.cache, false).await?.clone();
        let parsed = PackageRef::parse(package_ref)?;
        let pkg_info = src.fetch_package_info(&parsed.user, &parsed.package, false).await?;
        let resolved_version = Source::resolve_release_tag(&pkg_info, version)
            .ok_or_else(|| Error::decode(format!("no release tag could be resolved for {package_ref}")))?;
        let release_info = src.fetch_release_info(&pkg_info, &resolved_version, false).await?;
        let guide = release_info
            .guide(guide_name)
            .ok_or_else(|| Error::validation(format!("guide '{guide_name}' not defined for release '{resolved_version}'")))?;

        let env_dir = self.layout.env_dir(env);
        tokio::fs::create_dir_all(&env_dir).await?;
        let ctx = self.context_for(&env_dir, package_ref, &name, &resolved_version);
        self.run_guide(guide, &env_dir, &ctx, &name, env, force).await
    }

    async fn run_uninstall(&mut self, source: &str, package_ref: &str, env: &str, force: bool) -> Result<String> {
        if !self.ledger.is_installed(env, source, package_ref) {
            return Ok(format!("{package_ref} is not installed in {env}, nothing to do"));
        }

        let sources_map = self.sources_snapshot();
        let dependents = find_dependents(
            &self.ledger,
            env,
            source,
            package_ref,
            &sources_map,
            &mut self.registry,
            &self.cache,
        )
        .await?;
        if !dependents.is_empty() {
            if !force {
                let names: Vec<_> = dependents.iter().map(|d| d.dependent_package.clone()).collect();
                return Err(Error::dependency(format!(
                    "{package_ref} is required by: {}",
                    names.join(", ")
                )));
            }
            warn!(%package_ref, "uninstalling despite existing dependents (forced)");
        }

        let record = self
            .ledger
            .record(env, source, package_ref)
            .ok_or_else(|| Error::not_configured(format!("{source}:{package_ref} has no ledger record")))?
            .clone();

        let url = self.sources.get(source).ok_or_else(|| Error::not_configured(format!("source {source} is not configured")))?.to_string();
        let src = self.registry.get_or_init(source, &url, &self.cache, false).await?.clone();
        let parsed = PackageRef::parse(package_ref)?;
        let pkg_info = src.fetch_package_info(&parsed.user, &parsed.package, false).await?;
        let release_info = src.fetch_release_info(&pkg_info, &record.version, false).await?;
        let guide = release_info
            .guide("uninstall")
            .ok_or_else(|| Error::validation(format!("guide 'uninstall' not defined for release '{}'", record.version)))?;

        let env_dir = self.layout.env_dir(env);
        let ctx = self.context_for(&env_dir, package_ref, source, &record.version);
        let result = self.run_guide(guide, &env_dir, &ctx, source, env, force).await?;
        self.ledger.mark_uninstalled(env, source, package_ref).await?;
        Ok(result)
    }

    /// `refresh_sources()`: purge the metadata cache, drop the resolver
    /// cache, force-fetch each source's config+index. Failures for one
    /// source are accumulated, not fatal to the others.
    pub async fn refresh_sources(&mut self) -> Result<Vec<(String, Error)>> {
        self.cache.purge().await?;
        self.registry.clear();

        let mut failures = Vec::new();
        let names: Vec<String> = self.sources.list().keys().cloned().collect();
        for name in names {
            let url = self.sources.get(&name).unwrap_or_default().to_string();
            match self.registry.get_or_init(&name, &url, &self.cache, true).await {
                Ok(src) => {
                    let src = src.clone();
                    if let Err(e) = src.fetch_index(true).await {
                        failures.push((name, e));
                    }
                }
                Err(e) => failures.push((name, e)),
            }
        }
        Ok(failures)
    }

    /// `upgrade(env?, force)`: refresh sources, then run the `update` guide
    /// for every in-scope ledger entry. Missing `update` guides are silently
    /// skipped; other errors accumulate.
    pub async fn upgrade(&mut self, env: Option<&str>, force: bool) -> Result<Vec<String>> {
        self.refresh_sources().await?;
        let mut errors = Vec::new();

        for (env_id, records) in self.ledger.list_installed(env) {
            for (_key, record) in records {
                let target = match self.resolve_latest(&record.source, &record.package).await {
                    Ok(v) => v,
                    Err(e) => {
                        errors.push(format!("{}:{}: {e}", record.source, record.package));
                        continue;
                    }
                };
                match self.update_one(&record.source, &record.package, &target, &env_id, force).await {
                    Ok(()) => {}
                    Err(e) if e.is_guide_not_defined() => {}
                    Err(e) => errors.push(format!("{}:{}: {e}", record.source, record.package)),
                }
            }
        }
        Ok(errors)
    }

    /// `autoremove(env?, force)`: uninstall every non-explicit ledger entry.
    /// Missing `uninstall` guides are silently skipped; other errors
    /// accumulate. An entry with live dependents is skipped unless `force`.
    pub async fn autoremove(&mut self, env: Option<&str>, force: bool) -> Result<Vec<String>> {
        let mut errors = Vec::new();

        for (env_id, records) in self.ledger.list_installed(env) {
            for (_key, record) in records {
                if record.explicit {
                    continue;
                }
                match self.run_uninstall(&record.source, &record.package, &env_id, force).await {
                    Ok(_) => {}
                    Err(e) if e.is_guide_not_defined() => {}
                    Err(e) => errors.push(format!("{}:{}: {e}", record.source, record.package)),
                }
            }
        }
        Ok(errors)
    }

    async fn resolve_latest(&mut self, source: &str, package_ref: &str) -> Result<String> {
        let url = self
            .sources
            .get(source)
            .ok_or_else(|| Error::not_configured(format!("source {source} is not configured")))?
            .to_string();
        let src = self.registry.get_or_init(source, &url, &self.cache, false).await?.clone();
        let parsed = PackageRef::parse(package_ref)?;
        let pkg_info = src.fetch_package_info(&parsed.user, &parsed.package, false).await?;
        Source::resolve_release_tag(&pkg_info, None)
            .ok_or_else(|| Error::decode(format!("no release tag could be resolved for {package_ref}")))
    }

    fn sources_snapshot(&self) -> std::collections::HashMap<String, String> {
        self.sources.list().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    fn context_for(&self, env_dir: &std::path::Path, package_ref: &str, source_name: &str, release_id: &str) -> SubstitutionContext {
        SubstitutionContext {
            ypms_env_dir: env_dir.display().to_string(),
            os: host_os(),
            arch: host_arch(),
            package_ref: package_ref.to_string(),
            source_name: source_name.to_string(),
            release_id: release_id.to_string(),
        }
    }

    async fn run_guide(
        &mut self,
        guide: &ypms_guide::Guide,
        env_dir: &std::path::Path,
        ctx: &SubstitutionContext,
        source: &str,
        env: &str,
        force: bool,
    ) -> Result<String> {
        let client = self.cache.client().clone();
        let prev_source = self.current_source.replace(source.to_string());
        let result = ypms_guide::execute(guide, env_dir, ctx, &client, self, env, force).await;
        self.current_source = prev_source;
        result
    }
}

fn confirm_plan(plan: &Plan) -> Result<()> {
    println!("{}", console::style("The following operations will be performed:").bold());
    for op in &plan.operations {
        let verb = match op.kind {
            OperationKind::Install => "install",
            OperationKind::Update => "update",
            OperationKind::Target => "install (target)",
            OperationKind::Noop => continue,
        };
        let footnote = op.footnote.as_deref().unwrap_or_default();
        println!("  {verb} {}:{}@{} {footnote}", op.source, op.package_ref, op.version);
    }

    let proceed = dialoguer::Confirm::with_theme(&dialoguer::theme::ColorfulTheme::default())
        .with_prompt("Proceed?")
        .default(false)
        .interact()
        .map_err(|e| Error::validation(format!("failed to read confirmation: {e}")))?;

    if proceed {
        Ok(())
    } else {
        Err(Error::validation("installation aborted by user"))
    }
}

/// `Effects` reentry seam: `install-package`/`uninstall-package`/`add-repo`/
/// `remove-repo` steps call back through here (`spec.md` §9).
#[async_trait]
impl Effects for Manager {
    async fn is_installed(&mut self, env: &str, package_ref: &str) -> Result<bool> {
        let dep = DepEntry::parse_str(package_ref)?;
        let source = dep.source.or_else(|| self.current_source.clone()).ok_or_else(|| {
            Error::validation("dependency entry has no source and no ambient source context")
        })?;
        Ok(self.ledger.is_installed(env, &source, &dep.package.to_string()))
    }

    async fn install_dependency(&mut self, env: &str, dep_raw: &str) -> Result<()> {
        let dep = DepEntry::parse_str(dep_raw)?;
        let source = dep.source.or_else(|| self.current_source.clone()).ok_or_else(|| {
            Error::validation("dependency entry has no source and no ambient source context")
        })?;
        self.install_one(&source, &dep.package.to_string(), dep.version.as_deref(), env, false)
            .await?;
        Ok(())
    }

    async fn uninstall_dependency(&mut self, env: &str, package_ref: &str, force: bool) -> Result<()> {
        let dep = DepEntry::parse_str(package_ref)?;
        let source = dep.source.or_else(|| self.current_source.clone()).ok_or_else(|| {
            Error::validation("dependency entry has no source and no ambient source context")
        })?;
        self.run_uninstall(&source, &dep.package.to_string(), env, force).await?;
        Ok(())
    }

    async fn add_repo(&mut self, name: &str, url: &str) -> Result<()> {
        self.sources.add(name, url).await
    }

    async fn remove_repo(&mut self, name: &str) -> Result<()> {
        self.sources.remove(name).await
    }

    async fn has_repo(&mut self, name: &str) -> Result<bool> {
        Ok(self.sources.get(name).is_some())
    }
}
