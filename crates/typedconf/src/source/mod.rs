//! Backing stores that answer `(section, key)` lookups with raw strings.
//!
//! Every built-in source compares section and key names case-insensitively.
//! Sources never fail a lookup: a key they do not know is simply `None`, and
//! the provider moves on to the next source.

use std::fmt;

use crate::section::SectionPath;

mod cli;
mod env;
mod ini;
mod memory;

pub use cli::CommandLineSource;
pub use env::EnvironmentSource;
pub use ini::{IniFileLoader, IniFileSource, IniStringSource};
pub use memory::MemorySource;

/// A provider of raw string values addressed by section and key.
///
/// The [`Display`](fmt::Display) form is the identifying representation used
/// in diagnostics, e.g. `EnvironmentSource(prefix="APP")`.
pub trait ConfigSource: fmt::Display + Send + Sync {
    /// Look up the raw value of `key` in `section`.
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_sources_are_object_safe() {
        let sources: Vec<Arc<dyn ConfigSource>> = vec![
            Arc::new(MemorySource::new([("s", [("a", "1")])])),
            Arc::new(EnvironmentSource::new("")),
            Arc::new(CommandLineSource::from_args(Vec::<String>::new(), "")),
        ];
        let names: Vec<String> = sources.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            [
                "MemorySource",
                "EnvironmentSource(prefix=\"\")",
                "CommandLineSource(prefix=\"\")"
            ]
        );
    }
}
