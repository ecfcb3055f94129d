//! Instrumented sources for testing.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use typedconf::{ConfigSource, SectionPath};

/// A source that records every lookup before delegating to an inner source.
///
/// Used to assert how often the provider actually reaches its sources, e.g.
/// that a cached key is not looked up again.
#[derive(Clone)]
pub struct CountingSource {
    inner: Arc<dyn ConfigSource>,
    calls: Arc<Mutex<Vec<(SectionPath, String)>>>,
}

impl CountingSource {
    /// Record lookups and answer them from `inner`.
    #[must_use]
    pub fn wrap(inner: Arc<dyn ConfigSource>) -> Self {
        Self {
            inner,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record lookups and answer none of them.
    #[must_use]
    pub fn empty() -> Self {
        Self::wrap(Arc::new(typedconf::MemorySource::empty()))
    }

    /// Every recorded `(section, key)` lookup, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<(SectionPath, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded lookups.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Forget recorded lookups.
    pub fn reset(&self) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl ConfigSource for CountingSource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((section.clone(), key.to_owned()));
        self.inner.get_config_value(section, key)
    }
}

impl fmt::Display for CountingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CountingSource({})", self.inner)
    }
}

impl fmt::Debug for CountingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountingSource")
            .field("inner", &self.inner.to_string())
            .field("calls", &self.call_count())
            .finish()
    }
}
