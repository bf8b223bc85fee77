//! Manager facade: directory layout, `sources.json`, and the six top-level
//! operations over packages/envs/ledger (`spec.md` §4.5).

mod layout;
mod manager;
mod sources;

pub use layout::{debug_env_enabled, Layout, DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_URL};
pub use manager::Manager;
pub use sources::SourcesFile;
