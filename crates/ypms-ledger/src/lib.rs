//! Per-environment installed-package ledger and dependents lookup
//! (`spec.md` §4.6).

mod atomic;
mod dependents;
mod ledger;
mod types;

pub use dependents::{check_update_compat, find_dependents, Dependent};
pub use ledger::InstalledLedger;
pub use types::{ledger_key, LedgerDoc, Record};
