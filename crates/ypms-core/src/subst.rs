//! The fixed substitution context available to any templated value.
//!
//! Substitution is textual, single-pass, and non-recursive: `{FOO}` is
//! replaced with its value exactly once, and if that value itself contains
//! `{BAR}` it is left alone (`spec.md` §3).

/// The substitution variables bound for one guide execution.
#[derive(Debug, Clone)]
pub struct SubstitutionContext {
    /// Absolute path to the environment directory.
    pub ypms_env_dir: String,
    /// Normalized host OS tag.
    pub os: String,
    /// Normalized host arch tag.
    pub arch: String,
    /// `USER/PACKAGE`.
    pub package_ref: String,
    /// The source name the release was resolved from.
    pub source_name: String,
    /// The concrete (post-alias) release tag.
    pub release_id: String,
}

impl SubstitutionContext {
    fn value_for(&self, key: &str) -> Option<&str> {
        match key {
            "YPMS_ENV_DIR" => Some(&self.ypms_env_dir),
            "OS" => Some(&self.os),
            "ARCH" => Some(&self.arch),
            "PACKAGE_REF" => Some(&self.package_ref),
            "SOURCE_NAME" => Some(&self.source_name),
            "RELEASE_ID" => Some(&self.release_id),
            _ => None,
        }
    }

    /// Apply `{KEY}` substitution to `template`, single pass, non-recursive.
    ///
    /// Scans `template` once; each `{KEY}` token is replaced with its bound
    /// value and the scan resumes immediately after the closing brace in
    /// the *original* text. A value that happens to contain `{OTHER_KEY}`
    /// is never rescanned, so substitution cannot cascade.
    #[must_use]
    pub fn apply(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let Some(close_rel) = rest[open..].find('}') else {
                out.push_str(rest);
                return out;
            };
            let close = open + close_rel;
            let key = &rest[open + 1..close];
            out.push_str(&rest[..open]);
            match self.value_for(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        out.push_str(rest);
        out
    }

    /// The process-environment key/value pairs a `shell` step's subprocess
    /// inherits in addition to the caller's own environment
    /// (`spec.md` §4.4 `shell` step contract).
    #[must_use]
    pub fn as_env_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("YPMS_ENV_DIR", self.ypms_env_dir.clone()),
            ("OS", self.os.clone()),
            ("ARCH", self.arch.clone()),
            ("PACKAGE_REF", self.package_ref.clone()),
            ("SOURCE_NAME", self.source_name.clone()),
            ("RELEASE_ID", self.release_id.clone()),
        ]
    }
}
