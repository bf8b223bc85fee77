//! Guide execution (`spec.md` §4.4).
//!
//! Steps run in document order. A step whose `when` clause doesn't match the
//! host is skipped, not executed. If a guide has steps but none of them
//! match the host, that's a [`ypms_core::Error::PlatformMatch`] — a guide
//! that silently does nothing on an unsupported platform is indistinguishable
//! from a bug in the guide itself.

use std::path::Path;

use tracing::{debug, info};
use ypms_core::{Error, Result, SubstitutionContext};
use ypms_platform::{host_arch, host_os};

use crate::effects::Effects;
use crate::steps;
use crate::types::{Guide, StepType};

/// Run every platform-matching step of `guide` in order, returning the last
/// executed step's result string.
pub async fn execute(
    guide: &Guide,
    env_dir: &Path,
    ctx: &SubstitutionContext,
    client: &reqwest::Client,
    effects: &mut dyn Effects,
    env: &str,
    force: bool,
) -> Result<String> {
    let os = host_os();
    let arch = host_arch();
    let mut ran_any = false;
    let mut last = String::new();

    for step in guide.steps() {
        if !step.matches(&os, &arch) {
            debug!(step_type = ?step.step_type, "skipping step: platform mismatch");
            continue;
        }
        ran_any = true;
        info!(step_type = ?step.step_type, "executing guide step");

        last = match step.step_type {
            StepType::DownloadFile => {
                let content = step.content.as_ref();
                steps::download::download_file(
                    client,
                    content.ok_or_else(|| Error::validation("download-file step is missing content"))?,
                    env_dir,
                    ctx,
                )
                .await?
            }
            StepType::DownloadOnly => {
                let content = step.content.as_ref();
                steps::download::download_only(
                    client,
                    content.ok_or_else(|| Error::validation("download-only step is missing content"))?,
                    env_dir,
                    ctx,
                )
                .await?
            }
            StepType::RemoveFile => {
                let content = step.content.as_ref();
                steps::remove_file::remove_file(
                    content.ok_or_else(|| Error::validation("remove-file step is missing content"))?,
                    env_dir,
                    ctx,
                )
                .await?
            }
            StepType::Shell => {
                let content = step.content.as_ref();
                steps::shell::shell(
                    content.ok_or_else(|| Error::validation("shell step is missing content"))?,
                    env_dir,
                    ctx,
                )
                .await?
            }
            StepType::Python => steps::script::python().await?,
            StepType::LicenseAgreementUrl => {
                let content = step.content.as_ref();
                steps::license::license_agreement_url(
                    content.ok_or_else(|| {
                        Error::validation("license-agreement-url step is missing content")
                    })?,
                    ctx,
                )
                .await?
            }
            StepType::InstallPackage => {
                let content = step.content.as_ref();
                steps::package::install_package(
                    content.ok_or_else(|| Error::validation("install-package step is missing content"))?,
                    ctx,
                    env,
                    effects,
                )
                .await?
            }
            StepType::UninstallPackage => {
                let content = step.content.as_ref();
                steps::package::uninstall_package(
                    content
                        .ok_or_else(|| Error::validation("uninstall-package step is missing content"))?,
                    ctx,
                    env,
                    effects,
                    force,
                )
                .await?
            }
            StepType::AddRepo => {
                let content = step.content.as_ref();
                steps::repo::add_repo(
                    content.ok_or_else(|| Error::validation("add-repo step is missing content"))?,
                    ctx,
                    effects,
                )
                .await?
            }
            StepType::RemoveRepo => {
                let content = step.content.as_ref();
                steps::repo::remove_repo(
                    content.ok_or_else(|| Error::validation("remove-repo step is missing content"))?,
                    ctx,
                    effects,
                )
                .await?
            }
            StepType::None => last,
        };
    }

    if !ran_any {
        return Err(Error::platform_match(format!(
            "no guide step matched os={os} arch={arch}"
        )));
    }

    Ok(last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Step;

    struct NoEffects;

    #[async_trait::async_trait]
    impl Effects for NoEffects {
        async fn is_installed(&mut self, _env: &str, _package_ref: &str) -> Result<bool> {
            Ok(false)
        }
        async fn install_dependency(&mut self, _env: &str, _dep_raw: &str) -> Result<()> {
            Ok(())
        }
        async fn uninstall_dependency(&mut self, _env: &str, _package_ref: &str, _force: bool) -> Result<()> {
            Ok(())
        }
        async fn add_repo(&mut self, _name: &str, _url: &str) -> Result<()> {
            Ok(())
        }
        async fn remove_repo(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
        async fn has_repo(&mut self, _name: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn ctx() -> SubstitutionContext {
        SubstitutionContext {
            ypms_env_dir: "/tmp/env".to_string(),
            os: host_os(),
            arch: host_arch(),
            package_ref: "me/pkg".to_string(),
            source_name: "yopr".to_string(),
            release_id: "v1".to_string(),
        }
    }

    #[tokio::test]
    async fn no_op_step_leaves_last_result_unchanged() {
        // A `none` step following a real step must not clobber that step's
        // result: the guide's overall result stays whatever the install step
        // produced.
        let guide = Guide::Container {
            steps: vec![
                Step {
                    step_type: StepType::InstallPackage,
                    content: Some(sonic_rs::json!([])),
                    when: None,
                },
                Step {
                    step_type: StepType::None,
                    content: None,
                    when: None,
                },
            ],
        };
        let dir = tempfile::tempdir().unwrap();
        let mut effects = NoEffects;
        let client = reqwest::Client::new();
        let result = execute(&guide, dir.path(), &ctx(), &client, &mut effects, "default", false)
            .await
            .unwrap();
        assert_eq!(result, "installed [] into default");
    }

    #[tokio::test]
    async fn guide_with_no_matching_step_is_platform_match_error() {
        let guide = Guide::Container {
            steps: vec![Step {
                step_type: StepType::None,
                content: None,
                when: Some(ypms_platform::When {
                    os: Some(vec!["no-such-os".to_string()]),
                    arch: None,
                }),
            }],
        };
        let dir = tempfile::tempdir().unwrap();
        let mut effects = NoEffects;
        let client = reqwest::Client::new();
        let err = execute(&guide, dir.path(), &ctx(), &client, &mut effects, "default", false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::PlatformMatch(_)));
    }
}
