//! Metadata HTTP cache and file downloader for YPMS (`spec.md` §4.2).

pub mod download;
pub mod fetch;
pub mod observer;

pub use download::{download_file, download_file_with_observer};
pub use fetch::{MetadataCache, HTTP_TIMEOUT, USER_AGENT};
pub use observer::{NoopObserver, Observer};
