//! One module per [`crate::types::StepType`] handler.

pub mod download;
pub mod license;
pub mod package;
pub mod remove_file;
pub mod repo;
pub mod script;
pub mod shell;
