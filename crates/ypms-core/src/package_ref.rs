//! Package references and dependency entries.
//!
//! A bare ref is `USER/PACKAGE`. A dependency entry additionally accepts a
//! source override and a version pin, in either string (`"src:user/pkg@tag"`)
//! or object (`{source, package, version}`) form — see `spec.md` §3.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A resolved `USER/PACKAGE` reference within some (implicit or explicit) source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageRef {
    /// The `USER` half.
    pub user: String,
    /// The `PACKAGE` half.
    pub package: String,
}

impl PackageRef {
    /// Parse `"USER/PACKAGE"`, splitting on the first `/`.
    ///
    /// Both halves must be non-empty after trimming whitespace.
    pub fn parse(raw: &str) -> Result<Self> {
        let Some((user, package)) = raw.split_once('/') else {
            return Err(Error::validation(format!(
                "package ref must be 'USER/PACKAGE', e.g. 'ypsh/hello-world': got {raw:?}"
            )));
        };
        let user = user.trim();
        let package = package.trim();
        if user.is_empty() || package.is_empty() {
            return Err(Error::validation(format!(
                "invalid package ref {raw:?}: both USER and PACKAGE must be non-empty"
            )));
        }
        Ok(Self {
            user: user.to_string(),
            package: package.to_string(),
        })
    }
}

impl std::fmt::Display for PackageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.user, self.package)
    }
}

/// A dependency entry as it appears in `release.depends`: a bare ref, an
/// extended `SOURCE:USER/PACKAGE[@VERSION]` string, or an equivalent object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepEntry {
    /// `None` means "use the depending release's own source".
    pub source: Option<String>,
    /// The target package.
    pub package: PackageRef,
    /// `None` means "use whatever `resolve_release_tag` would pick".
    pub version: Option<String>,
}

/// Raw, untyped shape of a dependency entry as it comes off the wire: either
/// a string or an object with `package`/`source?`/`version?`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawDepEntry {
    /// `"user/pkg"`, `"user/pkg@tag"`, or `"src:user/pkg[@tag]"`.
    Str(String),
    /// `{source?, package, version?}`.
    Object {
        /// Optional source override.
        source: Option<String>,
        /// `USER/PACKAGE`, or a bare package ref.
        package: String,
        /// Optional version pin.
        version: Option<String>,
    },
}

impl DepEntry {
    /// Parse a raw dependency entry into its normalized form.
    pub fn from_raw(raw: &RawDepEntry) -> Result<Self> {
        match raw {
            RawDepEntry::Str(s) => Self::parse_str(s),
            RawDepEntry::Object {
                source,
                package,
                version,
            } => Ok(Self {
                source: source.clone(),
                package: PackageRef::parse(package)?,
                version: version.clone(),
            }),
        }
    }

    /// Parse `"user/pkg"`, `"user/pkg@tag"`, or `"src:user/pkg[@tag]"`.
    ///
    /// `SOURCE:` is only recognized as a source prefix when the text after
    /// the first `:` still contains a `/`; otherwise the colon is treated as
    /// part of a bare ref with no source override (`spec.md` §8 boundary
    /// behavior: "a colon preceding no `/` is a bare ref").
    pub fn parse_str(raw: &str) -> Result<Self> {
        let (source, rest) = match raw.split_once(':') {
            Some((src, rest)) if rest.contains('/') => (Some(src.to_string()), rest),
            _ => (None, raw),
        };

        let (ref_part, version) = match rest.split_once('@') {
            Some((r, v)) => (r, Some(v.to_string())),
            None => (rest, None),
        };

        Ok(Self {
            source,
            package: PackageRef::parse(ref_part)?,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_ref() {
        let r = PackageRef::parse("ypsh/hello-world").unwrap();
        assert_eq!(r.user, "ypsh");
        assert_eq!(r.package, "hello-world");
    }

    #[test]
    fn rejects_missing_slash() {
        assert!(PackageRef::parse("ypsh").is_err());
    }

    #[test]
    fn rejects_empty_halves() {
        assert!(PackageRef::parse("/pkg").is_err());
        assert!(PackageRef::parse("user/").is_err());
        assert!(PackageRef::parse(" / ").is_err());
    }

    #[test]
    fn trims_whitespace_around_halves() {
        let r = PackageRef::parse(" user / pkg ").unwrap();
        assert_eq!(r.user, "user");
        assert_eq!(r.package, "pkg");
    }

    #[test]
    fn dep_entry_bare() {
        let d = DepEntry::parse_str("a/lib").unwrap();
        assert_eq!(d.source, None);
        assert_eq!(d.version, None);
        assert_eq!(d.package.to_string(), "a/lib");
    }

    #[test]
    fn dep_entry_with_version() {
        let d = DepEntry::parse_str("a/lib@v2").unwrap();
        assert_eq!(d.version.as_deref(), Some("v2"));
    }

    #[test]
    fn dep_entry_with_source_and_version() {
        let d = DepEntry::parse_str("other:a/lib@v2").unwrap();
        assert_eq!(d.source.as_deref(), Some("other"));
        assert_eq!(d.package.to_string(), "a/lib");
        assert_eq!(d.version.as_deref(), Some("v2"));
    }

    #[test]
    fn colon_with_no_slash_anywhere_fails_rather_than_guessing_a_source() {
        // No '/' at all: the colon cannot be a source prefix (nothing to
        // split into user/package), so this is simply an invalid ref.
        let err = DepEntry::parse_str("weird:noslash").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn object_form() {
        let raw = RawDepEntry::Object {
            source: Some("other".into()),
            package: "a/lib".into(),
            version: Some("v1".into()),
        };
        let d = DepEntry::from_raw(&raw).unwrap();
        assert_eq!(d.source.as_deref(), Some("other"));
        assert_eq!(d.version.as_deref(), Some("v1"));
    }
}
