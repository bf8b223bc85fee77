//! Shared types and utilities for YPMS: package references, the
//! substitution context, the domain error, and JSON helpers.

pub mod error;
pub mod json;
pub mod package_ref;
pub mod subst;

pub use error::{Error, Result};
pub use package_ref::{DepEntry, PackageRef, RawDepEntry};
pub use subst::SubstitutionContext;
