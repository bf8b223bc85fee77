//! The `when` clause gating a guide step to a host OS/arch (`spec.md` §3, §4.4).

use serde::Deserialize;

use crate::probe::{normalize_arch, normalize_os};

/// A step's optional platform gate. `os`/`arch`, when present and
/// non-empty, must contain the host's normalized tag for the step to run;
/// absent or empty means unconstrained on that axis (`spec.md` §8:
/// `when.os=[]` with `when.arch` present means "no OS constraint, but arch
/// still constrains"). See [`When::matches`] for the exact rule.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct When {
    /// Candidate OS tags, compared case-insensitively.
    #[serde(default)]
    pub os: Option<Vec<String>>,
    /// Candidate arch tags, compared case-insensitively (aliases normalized
    /// the same way as the host tag).
    #[serde(default)]
    pub arch: Option<Vec<String>>,
}

impl When {
    /// `spec.md` §8 boundary behavior, read literally: `when` absent
    /// matches unconditionally. When present, each axis (`os`, `arch`) that
    /// is itself `Some` and **non-empty** constrains the step to containing
    /// the host tag; `None` (the field was omitted) leaves that axis
    /// unconstrained. An explicit empty list is treated the same as absent
    /// for that axis — an empty constraint list carries no restricting
    /// information, matching the reference implementation's `dict.get(key,
    /// [])` style defaults where an empty list is simply "nothing declared".
    #[must_use]
    pub fn matches(&self, host_os: &str, host_arch: &str) -> bool {
        let os_ok = match &self.os {
            Some(list) if !list.is_empty() => list
                .iter()
                .any(|o| normalize_os(o) == normalize_os(host_os)),
            _ => true,
        };
        let arch_ok = match &self.arch {
            Some(list) if !list.is_empty() => list
                .iter()
                .any(|a| normalize_arch(a) == normalize_arch(host_arch)),
            _ => true,
        };
        os_ok && arch_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_when_matches_everything() {
        let w = When::default();
        assert!(w.matches("linux", "x86_64"));
        assert!(w.matches("windows", "arm64"));
    }

    #[test]
    fn os_list_constrains() {
        let w = When {
            os: Some(vec!["linux".into()]),
            arch: None,
        };
        assert!(w.matches("Linux", "x86_64"));
        assert!(!w.matches("darwin", "x86_64"));
    }

    #[test]
    fn empty_os_list_with_arch_present_is_os_unconstrained() {
        let w = When {
            os: Some(vec![]),
            arch: Some(vec!["arm64".into()]),
        };
        assert!(w.matches("windows", "aarch64"));
        assert!(!w.matches("windows", "x86_64"));
    }

    #[test]
    fn arch_aliases_are_normalized_before_comparison() {
        let w = When {
            os: None,
            arch: Some(vec!["amd64".into()]),
        };
        assert!(w.matches("linux", "x86_64"));
    }

    #[test]
    fn comparison_is_case_insensitive() {
        let w = When {
            os: Some(vec!["LINUX".into()]),
            arch: None,
        };
        assert!(w.matches("linux", "x86_64"));
    }
}
