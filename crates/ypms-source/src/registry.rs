//! A lazily populated `name -> Source` cache, evicted on forced refresh
//! (`spec.md` §9: "treat it as a cache-with-key, not a singleton").

use std::collections::HashMap;

use ypms_cache::MetadataCache;
use ypms_core::Result;

use crate::source::Source;

/// Caches constructed [`Source`]s by name so repeated operations against the
/// same source don't re-fetch its repo descriptor.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    sources: HashMap<String, Source>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or construct the `Source` for `name`/`config_url`. `force_refresh`
    /// evicts any cached entry before reconstruction, so the repo descriptor
    /// is re-fetched.
    pub async fn get_or_init(
        &mut self,
        name: &str,
        config_url: &str,
        cache: &MetadataCache,
        force_refresh: bool,
    ) -> Result<&Source> {
        if force_refresh {
            self.sources.remove(name);
        }
        if !self.sources.contains_key(name) {
            let source = Source::new(name, config_url, cache.clone(), force_refresh).await?;
            self.sources.insert(name.to_string(), source);
        }
        Ok(self.sources.get(name).expect("just inserted"))
    }

    /// Drop every cached source, e.g. after a `refresh_sources` operation.
    pub fn clear(&mut self) {
        self.sources.clear();
    }
}
