//! The single domain error kind shared across every YPMS crate.
//!
//! `spec.md` §7 calls for one error kind with a human-readable message per
//! failure, bucketed into eight categories. Each variant below is one of
//! those categories; callers match on the variant when a category-specific
//! response is needed (e.g. `upgrade`/`autoremove` silently skip a
//! `Error::Validation` that says "guide not defined").

use std::fmt;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// A single domain error, categorized per `spec.md` §7.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP status, DNS, timeout, or connection failure.
    #[error("network error: {0}")]
    Network(String),

    /// Invalid JSON at a URL, or a missing required key in a fetched document.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed package ref, bad dependency entry, unknown step type, etc.
    #[error("validation error: {0}")]
    Validation(String),

    /// No guide step matched the current host OS/arch.
    #[error("no guide step matched current platform/arch: {0}")]
    PlatformMatch(String),

    /// A `check=true` shell step exited non-zero.
    #[error("process exited with status {code}: {message}")]
    Process {
        /// The subprocess exit code.
        code: i32,
        /// Context describing which step failed.
        message: String,
    },

    /// Permission denied, or a missing path where `missing_ok` is false.
    #[error("filesystem error: {0}")]
    Filesystem(String),

    /// Uninstall blocked by a dependent, or update blocked by a version pin.
    #[error("dependency error: {0}")]
    Dependency(String),

    /// Unknown source, or an empty sources map.
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl Error {
    /// Shorthand for [`Error::Network`].
    pub fn network(msg: impl fmt::Display) -> Self {
        Self::Network(msg.to_string())
    }

    /// Shorthand for [`Error::Decode`].
    pub fn decode(msg: impl fmt::Display) -> Self {
        Self::Decode(msg.to_string())
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Shorthand for [`Error::PlatformMatch`].
    pub fn platform_match(msg: impl fmt::Display) -> Self {
        Self::PlatformMatch(msg.to_string())
    }

    /// Shorthand for [`Error::Process`].
    pub fn process(code: i32, message: impl fmt::Display) -> Self {
        Self::Process {
            code,
            message: message.to_string(),
        }
    }

    /// Shorthand for [`Error::Filesystem`].
    pub fn filesystem(msg: impl fmt::Display) -> Self {
        Self::Filesystem(msg.to_string())
    }

    /// Shorthand for [`Error::Dependency`].
    pub fn dependency(msg: impl fmt::Display) -> Self {
        Self::Dependency(msg.to_string())
    }

    /// Shorthand for [`Error::NotConfigured`].
    pub fn not_configured(msg: impl fmt::Display) -> Self {
        Self::NotConfigured(msg.to_string())
    }

    /// `true` for the specific "guide not defined" validation failure that
    /// `upgrade`/`autoremove` must silently skip rather than accumulate.
    #[must_use]
    pub fn is_guide_not_defined(&self) -> bool {
        matches!(self, Self::Validation(msg) if msg.contains("not defined"))
    }
}

impl From<sonic_rs::Error> for Error {
    fn from(err: sonic_rs::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Filesystem(err.to_string())
    }
}
