use std::collections::HashMap;
use std::fmt;

use super::ConfigSource;
use crate::section::SectionPath;

/// An in-memory mapping of section → key → value.
///
/// Section and key names are lowercased once at construction. A multi-level
/// [`SectionPath`] addresses the section named by its segments joined with
/// `.`, the way INI files spell nested sections.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    sections: HashMap<String, HashMap<String, String>>,
}

impl MemorySource {
    /// Build a source from nested `(section, [(key, value)])` pairs.
    pub fn new<S, K, V, I, O>(sections: O) -> Self
    where
        O: IntoIterator<Item = (S, I)>,
        I: IntoIterator<Item = (K, V)>,
        S: AsRef<str>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut normalized: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (section, keys) in sections {
            let entry = normalized
                .entry(section.as_ref().to_lowercase())
                .or_default();
            for (key, value) in keys {
                entry.insert(key.as_ref().to_lowercase(), value.into());
            }
        }
        Self {
            sections: normalized,
        }
    }

    /// A source with no values.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

impl ConfigSource for MemorySource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.sections
            .get(&section.joined(".").to_lowercase())?
            .get(&key.to_lowercase())
            .cloned()
    }
}

impl fmt::Display for MemorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemorySource")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_lookup_is_case_insensitive() {
        let source = MemorySource::new([("s", [("A", "1"), ("b", "2")])]);

        let s = SectionPath::from("s");
        assert_eq!(source.get_config_value(&s, "A").as_deref(), Some("1"));
        assert_eq!(source.get_config_value(&s, "a").as_deref(), Some("1"));
        assert_eq!(source.get_config_value(&s, "B").as_deref(), Some("2"));
        assert_eq!(source.get_config_value(&s, "b").as_deref(), Some("2"));
        assert_eq!(
            source.get_config_value(&SectionPath::from("S"), "b").as_deref(),
            Some("2")
        );
        assert!(source.get_config_value(&SectionPath::from("t"), "A").is_none());
        assert!(source.get_config_value(&s, "C").is_none());
        assert_eq!(source.to_string(), "MemorySource");
    }

    #[test]
    fn test_memory_source_nested_section() {
        let source = MemorySource::new([("server.tls", [("cert", "/etc/cert.pem")])]);
        assert_eq!(
            source
                .get_config_value(&SectionPath::from(["server", "tls"]), "CERT")
                .as_deref(),
            Some("/etc/cert.pem")
        );
    }

    #[test]
    fn test_empty_memory_source() {
        let source = MemorySource::empty();
        assert!(source.get_config_value(&SectionPath::from("s"), "a").is_none());
    }
}
