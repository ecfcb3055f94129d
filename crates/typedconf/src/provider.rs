//! The shared holder of ordered sources and the resolved-value cache.
//!
//! One provider is typically shared (through an `Arc`) by a whole tree of
//! config instances, so a parent and its group children read the same
//! sources and fill the same cache.
//!
//! Individual operations take a short internal lock, but nothing coordinates
//! sequences of operations: a lookup racing with `set_sources` sees either
//! list. Callers that mutate a provider from several threads must serialize
//! those sequences themselves.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::section::SectionPath;
use crate::source::ConfigSource;

/// A type-erased resolved value as stored in the cache.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

type CacheKey = (SectionPath, String);

/// Ordered config sources plus a cache of resolved values.
#[derive(Default)]
pub struct ConfigProvider {
    sources: RwLock<Vec<Arc<dyn ConfigSource>>>,
    cache: RwLock<HashMap<CacheKey, CachedValue>>,
}

impl ConfigProvider {
    /// Create a provider with no sources.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider holding `sources` in order.
    pub fn with_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ConfigSource>>,
    {
        let provider = Self::new();
        provider.set_sources(sources);
        provider
    }

    /// Snapshot of the current sources, highest precedence first.
    #[must_use]
    pub fn config_sources(&self) -> Vec<Arc<dyn ConfigSource>> {
        self.sources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append a source with the lowest precedence.
    pub fn add_source(&self, source: Arc<dyn ConfigSource>) {
        debug!(source = %source, "adding config source");
        self.sources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(source);
    }

    /// Replace every source with `sources`, in order.
    pub fn set_sources<I>(&self, sources: I)
    where
        I: IntoIterator<Item = Arc<dyn ConfigSource>>,
    {
        let sources: Vec<_> = sources.into_iter().collect();
        debug!(count = sources.len(), "setting config sources");
        *self.sources.write().unwrap_or_else(PoisonError::into_inner) = sources;
    }

    /// Swap `old` (matched by identity) for `new`, keeping its position.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SourceNotFound`] if `old` is not held by this
    /// provider.
    pub fn replace_source(
        &self,
        old: &Arc<dyn ConfigSource>,
        new: Arc<dyn ConfigSource>,
    ) -> ConfigResult<()> {
        let mut sources = self.sources.write().unwrap_or_else(PoisonError::into_inner);
        let slot = sources
            .iter_mut()
            .find(|source| Arc::ptr_eq(source, old))
            .ok_or_else(|| ConfigError::SourceNotFound {
                description: old.to_string(),
            })?;
        debug!(old = %old, new = %new, "replacing config source");
        *slot = new;
        Ok(())
    }

    /// First raw value any source supplies for `key` in `section`.
    #[must_use]
    pub fn get_key(&self, section: &SectionPath, key: &str) -> Option<String> {
        // Query a snapshot so sources are never called under the lock.
        for source in self.config_sources() {
            debug!(%section, key, %source, "looking for config value");
            if let Some(value) = source.get_config_value(section, key) {
                debug!(%section, key, %source, "found config value");
                return Some(value);
            }
        }
        None
    }

    /// Store a resolved value.
    pub fn add_to_cache(&self, section: SectionPath, key: impl Into<String>, value: CachedValue) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((section, key.into()), value);
    }

    /// Fetch a previously resolved value.
    #[must_use]
    pub fn get_from_cache(&self, section: &SectionPath, key: &str) -> Option<CachedValue> {
        // Tuple keys cannot be borrowed as (&SectionPath, &str), so the
        // lookup key is built owned.
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(section.clone(), key.to_owned()))
            .cloned()
    }

    /// Drop every cached value.
    pub fn clear_cache(&self) {
        debug!("clearing config cache");
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl fmt::Debug for ConfigProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources: Vec<String> = self
            .config_sources()
            .iter()
            .map(ToString::to_string)
            .collect();
        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ConfigProvider")
            .field("sources", &sources)
            .field("cached", &cached)
            .finish()
    }
}
