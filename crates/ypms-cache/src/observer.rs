//! Optional download-progress sink.
//!
//! The terminal UI that would implement this is out of scope for the core
//! (`spec.md` §1, §4.2): the core only guarantees that a download either
//! produces the destination file or fails with an error. `Observer` exists
//! so a CLI layer *can* report progress without the cache crate depending
//! on any terminal library.
pub trait Observer: Send + Sync {
    /// Called after each chunk is written. `total` is `None` when the
    /// server did not send a `Content-Length`.
    fn on_progress(&self, downloaded: u64, total: Option<u64>);
}

/// An observer that does nothing, used when no progress reporting is wanted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_progress(&self, _downloaded: u64, _total: Option<u64>) {}
}
