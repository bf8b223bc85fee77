//! Operation planner: from a root install request to an ordered plan over
//! declared dependencies (`spec.md` §4.7).

mod planner;
mod types;

pub use planner::plan_install;
pub use types::{Operation, OperationKind, Plan};
