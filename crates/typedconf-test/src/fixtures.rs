//! Test fixtures for common sources.

use std::sync::Arc;

use typedconf::{ConfigSource, MemorySource};

/// An in-memory source from nested `(section, [(key, value)])` pairs.
#[must_use]
pub fn memory_source<'a, I, O>(sections: O) -> Arc<dyn ConfigSource>
where
    O: IntoIterator<Item = (&'a str, I)>,
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    Arc::new(MemorySource::new(sections))
}

/// A source that knows nothing.
#[must_use]
pub fn empty_source() -> Arc<dyn ConfigSource> {
    Arc::new(MemorySource::empty())
}

/// The INI document used across the source tests: section `s` with keys
/// `a = 1` and `B = 2`.
pub const SAMPLE_INI: &str = "
[s]
a = 1
B = 2
";
