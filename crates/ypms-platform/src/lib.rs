//! Host platform probing and `when`-clause matching for YPMS guides.

pub mod probe;
pub mod when;

pub use probe::{host_arch, host_os, normalize_arch, normalize_os};
pub use when::When;
