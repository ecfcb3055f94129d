use std::fmt;

use super::ConfigSource;
use crate::section::SectionPath;

/// Reads `--[prefix_]section_key` flags from command-line arguments.
///
/// The flag name is fully lowercased and nested section segments are joined
/// with `_`. Both `--flag value` and `--flag=value` are understood, unknown
/// flags are skipped and the last occurrence of a flag wins.
#[derive(Debug, Clone)]
pub struct CommandLineSource {
    prefix: String,
    args: Option<Vec<String>>,
}

impl CommandLineSource {
    /// Read the process arguments (`std::env::args`) at every lookup.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            args: None,
        }
    }

    /// Read a fixed argument list instead of the process arguments. The list
    /// must not include the program name.
    pub fn from_args<I, S>(args: I, prefix: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefix: prefix.into(),
            args: Some(args.into_iter().map(Into::into).collect()),
        }
    }

    /// Flag consulted for `key` in `section`, including the leading `--`.
    #[must_use]
    pub fn flag_name(&self, section: &SectionPath, key: &str) -> String {
        let name = if self.prefix.is_empty() {
            format!("--{}_{key}", section.joined("_"))
        } else {
            format!("--{}_{}_{key}", self.prefix, section.joined("_"))
        };
        name.to_lowercase()
    }
}

/// Value of the last occurrence of `flag` in `args`.
fn scan<I>(args: I, flag: &str) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut found = None;
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == flag {
            // A flag with no following value is ignored.
            if let Some(value) = args.next() {
                found = Some(value);
            }
        } else if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            found = Some(value.to_owned());
        }
    }
    found
}

impl ConfigSource for CommandLineSource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        let flag = self.flag_name(section, key);
        match &self.args {
            Some(args) => scan(args.iter().cloned(), &flag),
            None => scan(std::env::args().skip(1), &flag),
        }
    }
}

impl fmt::Display for CommandLineSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandLineSource(prefix={:?})", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_name() {
        let source = CommandLineSource::from_args(Vec::<String>::new(), "App");
        assert_eq!(
            source.flag_name(&SectionPath::from("DB"), "Host"),
            "--app_db_host"
        );
        let source = CommandLineSource::from_args(Vec::<String>::new(), "");
        assert_eq!(source.flag_name(&SectionPath::from("s"), "A"), "--s_a");
    }

    #[test]
    fn test_command_line_lookup() {
        let source = CommandLineSource::from_args(
            ["--unknown", "x", "--s_a", "1", "--verbose", "--s_b=2"],
            "",
        );
        let s = SectionPath::from("s");
        assert_eq!(source.get_config_value(&s, "A").as_deref(), Some("1"));
        assert_eq!(source.get_config_value(&s, "a").as_deref(), Some("1"));
        assert_eq!(source.get_config_value(&s, "B").as_deref(), Some("2"));
        assert!(source.get_config_value(&SectionPath::from("t"), "A").is_none());
        assert!(source.get_config_value(&s, "C").is_none());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let source =
            CommandLineSource::from_args(["--app_s_a", "1", "--app_s_a=3"], "app");
        assert_eq!(
            source
                .get_config_value(&SectionPath::from("s"), "a")
                .as_deref(),
            Some("3")
        );
    }

    #[test]
    fn test_prefix_mismatch_is_absent() {
        let source = CommandLineSource::from_args(["--s_a", "1"], "app");
        assert!(source.get_config_value(&SectionPath::from("s"), "a").is_none());
        assert_eq!(source.to_string(), "CommandLineSource(prefix=\"app\")");
    }

    #[test]
    fn test_similar_flag_is_not_matched() {
        let source = CommandLineSource::from_args(["--s_ab", "1", "--s_a_b=2"], "");
        assert!(source.get_config_value(&SectionPath::from("s"), "a").is_none());
    }
}
