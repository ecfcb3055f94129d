use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use ::ini::{Ini, ParseOption};
use tracing::debug;

use super::ConfigSource;
use crate::error::{ConfigError, ConfigResult};
use crate::section::SectionPath;

/// Section whose entries every other section inherits.
const DEFAULT_SECTION: &str = "DEFAULT";

/// Parsed INI content: lowercased section name → lowercased key → raw value.
///
/// Dotted section headers such as `[server.tls]` are kept under their dotted
/// name, which is how a nested [`SectionPath`] addresses them. Values are
/// stored exactly as written: quotes and backslashes are not interpreted.
#[derive(Debug, Clone, Default)]
struct IniSections(HashMap<String, HashMap<String, String>>);

impl IniSections {
    fn parse(text: &str, origin: &str) -> ConfigResult<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let document =
            Ini::load_from_str_opt(text, options).map_err(|source| ConfigError::ParseError {
                origin: origin.to_owned(),
                source,
            })?;

        let mut defaults: HashMap<String, String> = HashMap::new();
        let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
        for (name, properties) in document.iter() {
            // Keys above the first header belong to no section.
            let Some(name) = name else { continue };
            let entries = if name == DEFAULT_SECTION {
                &mut defaults
            } else {
                sections.entry(name.to_lowercase()).or_default()
            };
            for (key, value) in properties.iter() {
                entries.insert(key.to_lowercase(), value.to_owned());
            }
        }

        for entries in sections.values_mut() {
            for (key, value) in &defaults {
                entries
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }
        if !defaults.is_empty() {
            sections
                .entry(DEFAULT_SECTION.to_lowercase())
                .or_default()
                .extend(defaults);
        }
        Ok(Self(sections))
    }

    fn get(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.0
            .get(&section.joined(".").to_lowercase())?
            .get(&key.to_lowercase())
            .cloned()
    }
}

/// An INI document given as a string literal, parsed at construction.
#[derive(Debug, Clone)]
pub struct IniStringSource {
    sections: IniSections,
}

impl IniStringSource {
    /// Parse `text`; parse errors name the origin `<string>`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if `text` is not valid INI.
    pub fn new(text: &str) -> ConfigResult<Self> {
        Self::with_origin(text, "<string>")
    }

    /// Parse `text`, naming it `origin` in parse errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseError`] if `text` is not valid INI.
    pub fn with_origin(text: &str, origin: &str) -> ConfigResult<Self> {
        Ok(Self {
            sections: IniSections::parse(text, origin)?,
        })
    }
}

impl ConfigSource for IniStringSource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.sections.get(section, key)
    }
}

impl fmt::Display for IniStringSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IniStringSource")
    }
}

/// An INI file read once, at construction.
#[derive(Debug, Clone)]
pub struct IniFileSource {
    path: PathBuf,
    sections: IniSections,
}

impl IniFileSource {
    /// Read a UTF-8 file that must exist.
    ///
    /// # Errors
    ///
    /// See [`IniFileLoader::load`].
    pub fn open(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::loader(path).load()
    }

    /// Start configuring how the file at `path` is read.
    pub fn loader(path: impl AsRef<Path>) -> IniFileLoader {
        IniFileLoader {
            path: path.as_ref().to_path_buf(),
            encoding: None,
            must_exist: true,
        }
    }

    /// Path the source was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for IniFileSource {
    fn get_config_value(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.sections.get(section, key)
    }
}

impl fmt::Display for IniFileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IniFileSource(filename={:?})",
            self.path.display().to_string()
        )
    }
}

/// Options for reading an [`IniFileSource`].
#[derive(Debug, Clone)]
#[must_use]
pub struct IniFileLoader {
    path: PathBuf,
    encoding: Option<String>,
    must_exist: bool,
}

impl IniFileLoader {
    /// Decode the file with the named encoding (a WHATWG label such as
    /// `utf-8` or `windows-1252`). Defaults to UTF-8.
    pub fn encoding(mut self, label: impl Into<String>) -> Self {
        self.encoding = Some(label.into());
        self
    }

    /// Whether a missing file is an error (the default) or an empty source.
    pub fn must_exist(mut self, must_exist: bool) -> Self {
        self.must_exist = must_exist;
        self
    }

    /// Read and parse the file.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnknownEncoding`] if the encoding label is not known
    /// - [`ConfigError::FileNotFound`] if the file is absent and must exist
    /// - [`ConfigError::ReadError`] if the file cannot be read or decoded
    /// - [`ConfigError::ParseError`] if the content is not valid INI
    pub fn load(self) -> ConfigResult<IniFileSource> {
        let encoding = match &self.encoding {
            Some(label) => encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                ConfigError::UnknownEncoding {
                    label: label.clone(),
                }
            })?,
            None => encoding_rs::UTF_8,
        };

        let shown = self.path.display().to_string();
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.must_exist {
                    return Err(ConfigError::FileNotFound { path: shown });
                }
                debug!(path = %shown, "config file not found, using empty source");
                return Ok(IniFileSource {
                    path: self.path,
                    sections: IniSections::default(),
                });
            },
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: shown,
                    source: e,
                });
            },
        };

        let text = encoding
            .decode_without_bom_handling_and_without_replacement(&bytes)
            .ok_or_else(|| ConfigError::ReadError {
                path: shown.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("content is not valid {}", encoding.name()),
                ),
            })?;

        let sections = IniSections::parse(&text, &shown)?;
        debug!(path = %shown, encoding = encoding.name(), "loaded config file");
        Ok(IniFileSource {
            path: self.path,
            sections,
        })
    }
}
