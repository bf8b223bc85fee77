//! Source config parsing, package/release metadata fetching, and release-tag
//! resolution (`spec.md` §4.3).

mod registry;
mod source;
mod types;

pub use registry::SourceRegistry;
pub use source::Source;
pub use types::{PackageInfo, ReleaseInfo, RepoConfig};
