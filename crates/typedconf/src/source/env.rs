use std::fmt;

use super::ConfigSource;
use crate::section::SectionPath;

/// Reads `[PREFIX_]SECTION_KEY` from the process environment.
///
/// The variable name is fully uppercased. Segments of a nested section path
/// are joined with `_`. Underscores inside names are not escaped, so
/// `("a_b", "c")` and `("a", "b_c")` read the same variable.
///
/// The environment is consulted on every lookup, not snapshotted.
#[derive(Debug, Clone)]
pub struct EnvironmentSource {
    prefix: String,
}

impl EnvironmentSource {
    /// Create a source reading variables under `prefix` (may be empty).
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix as given at construction.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Name of the variable consulted for `key` in `section`.
    #[must_use]
    pub fn variable_name(&self, section: &SectionPath, key: &str) -> String {
        let name = if self.prefix.is_empty() {
            format!("{}_{key}", section.joined("_"))
        } else {
            format!("{}_{}_{key}", self.prefix, section.joined("_"))
        };
        name.to_uppercase()
    }
}

impl ConfigSource for EnvironmentSource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        std::env::var(self.variable_name(section, key)).ok()
    }
}

impl fmt::Display for EnvironmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvironmentSource(prefix={:?})", self.prefix)
    }
}
