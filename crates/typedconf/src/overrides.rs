//! Values injected into the cache after a config has been read.

use std::sync::Arc;

use crate::key::ConfigValue;
use crate::provider::CachedValue;

/// One override entry.
#[derive(Debug, Clone)]
pub enum Override {
    /// Replaces the cached value of a key. Must have the key's Rust type.
    Value(CachedValue),
    /// Overrides addressed to the keys of a group key's child config.
    Nested(Overrides),
}

/// An ordered mapping of declared member name to [`Override`].
///
/// Returned from [`Config::post_read_hook`](crate::Config::post_read_hook).
/// Setting the same name twice keeps the later entry.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Overrides {
    entries: Vec<(String, Override)>,
}

impl Overrides {
    /// No overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the key declared as `attr` with `value`.
    pub fn value<T: ConfigValue>(self, attr: impl Into<String>, value: T) -> Self {
        self.with(attr, Override::Value(Arc::new(value)))
    }

    /// Override keys of the child config declared as `attr`.
    pub fn nested(self, attr: impl Into<String>, overrides: Overrides) -> Self {
        self.with(attr, Override::Nested(overrides))
    }

    /// Add or replace the entry for `attr`.
    pub fn with(mut self, attr: impl Into<String>, entry: Override) -> Self {
        let attr = attr.into();
        match self.entries.iter_mut().find(|(name, _)| *name == attr) {
            Some((_, slot)) => *slot = entry,
            None => self.entries.push((attr, entry)),
        }
        self
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Override)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_entry_replaces_earlier() {
        let overrides = Overrides::new()
            .value("a", 1_i32)
            .nested("child", Overrides::new().value("b", "x".to_owned()))
            .value("a", 2_i32);

        assert_eq!(overrides.len(), 2);
        let names: Vec<&str> = overrides.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a", "child"]);

        let Some((_, Override::Value(value))) = overrides.iter().next() else {
            panic!("expected a value override");
        };
        assert_eq!(value.downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn test_empty() {
        assert!(Overrides::new().is_empty());
        assert!(!Overrides::new().value("a", true).is_empty());
    }
}
