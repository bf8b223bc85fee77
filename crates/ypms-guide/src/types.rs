//! Guide/step document shapes (`spec.md` §3, §4.4).

use serde::Deserialize;
use ypms_platform::When;

/// A guide's step types. Unknown type strings fail to deserialize, which
/// surfaces as a [`ypms_core::Error::Decode`] — matching `spec.md` §7's
/// "unknown step type" validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    DownloadFile,
    DownloadOnly,
    RemoveFile,
    Shell,
    Python,
    LicenseAgreementUrl,
    InstallPackage,
    UninstallPackage,
    AddRepo,
    RemoveRepo,
    None,
}

/// One step inside a guide.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// The step's handler.
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Shape depends on `step_type`; see each `steps::*` module.
    #[serde(default)]
    pub content: Option<sonic_rs::Value>,
    /// Optional platform gate.
    #[serde(default)]
    pub when: Option<When>,
}

impl Step {
    /// Does this step's `when` clause match the given host tags?
    #[must_use]
    pub fn matches(&self, host_os: &str, host_arch: &str) -> bool {
        self.when
            .as_ref()
            .map_or(true, |w| w.matches(host_os, host_arch))
    }
}

/// A guide: either one step, or an ordered container of steps.
/// `package.release.guides.<name>` holds one of these.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Guide {
    /// `{steps: [...]}`.
    Container {
        /// The ordered steps.
        steps: Vec<Step>,
    },
    /// `{type, content, when?}`.
    Single(Step),
}

impl Guide {
    /// Normalize to a flat, ordered list of steps.
    #[must_use]
    pub fn steps(&self) -> Vec<Step> {
        match self {
            Self::Container { steps } => steps.clone(),
            Self::Single(step) => vec![step.clone()],
        }
    }

    /// Scan this guide for the repo names an `add-repo` step would add,
    /// without executing anything. Used by the planner to predict which
    /// sources an upcoming install will provide (`spec.md` §4.4 "Helper").
    #[must_use]
    pub fn predicted_repo_names(&self) -> Vec<String> {
        self.steps()
            .into_iter()
            .filter(|s| s.step_type == StepType::AddRepo)
            .filter_map(|s| s.content)
            .flat_map(|content| crate::steps::repo::predicted_names(&content))
            .collect()
    }
}
