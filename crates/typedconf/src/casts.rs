//! Cast functions turning raw source strings into typed values.
//!
//! Every cast is a plain `Fn(&str) -> Result<T, CastError>` and can be handed
//! to [`Key::cast`](crate::Key::cast). Casts whose result may legitimately be
//! "no value" return `Result<Option<T>, CastError>` and are attached with
//! [`Key::cast_optional`](crate::Key::cast_optional).

use std::fmt::Display;
use std::str::FromStr;

use strum::VariantNames;

use crate::error::CastError;

const TRUE_TOKENS: &[&str] = &["1", "true", "yes", "on"];
const FALSE_TOKENS: &[&str] = &["0", "false", "no", "off"];
const UNKNOWN_TOKENS: &[&str] = &["none", "unknown"];

/// Parse the raw value with its [`FromStr`] implementation.
///
/// # Errors
///
/// Returns [`CastError::Format`] with the parser's message.
pub fn parse<T>(raw: &str) -> Result<T, CastError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e: T::Err| CastError::Format {
        value: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// Build a cast mapping a variant name onto a member of `E`.
///
/// The name must match one of `E::VARIANTS` exactly; derive
/// `strum::VariantNames` and `strum::EnumString` on the enum.
pub fn enum_cast<E>() -> impl Fn(&str) -> Result<E, CastError> + Send + Sync + 'static
where
    E: FromStr + VariantNames + 'static,
{
    |raw| {
        let lookup_failed = || CastError::Lookup {
            value: raw.to_owned(),
            expected: format!("[{}]", E::VARIANTS.join(", ")),
        };
        if !E::VARIANTS.contains(&raw) {
            return Err(lookup_failed());
        }
        raw.parse().map_err(|_| lookup_failed())
    }
}

/// Options controlling how a delimited string is split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Separator between elements.
    pub delimiter: String,
    /// Drop a final empty element, as in `"a,b,"`.
    pub ignore_trailing_delimiter: bool,
    /// Trim whitespace around each element.
    pub strip: bool,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_owned(),
            ignore_trailing_delimiter: true,
            strip: true,
        }
    }
}

impl ListOptions {
    /// Use `delimiter` as the element separator.
    #[must_use]
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Keep a trailing empty element instead of dropping it.
    #[must_use]
    pub fn keep_trailing_delimiter(mut self) -> Self {
        self.ignore_trailing_delimiter = false;
        self
    }

    /// Leave surrounding whitespace on each element.
    #[must_use]
    pub fn no_strip(mut self) -> Self {
        self.strip = false;
        self
    }

    fn split<'a>(&self, raw: &'a str) -> Vec<&'a str> {
        // An empty input is an empty list whatever the other options say.
        if raw.is_empty() {
            return Vec::new();
        }

        let mut pieces: Vec<&str> = raw
            .split(self.delimiter.as_str())
            .map(|piece| if self.strip { piece.trim() } else { piece })
            .collect();

        if self.ignore_trailing_delimiter && pieces.last().is_some_and(|last| last.is_empty()) {
            pieces.pop();
        }
        pieces
    }
}

/// Build a cast splitting the raw value into a list of strings.
pub fn string_list_cast(
    options: ListOptions,
) -> impl Fn(&str) -> Result<Vec<String>, CastError> + Send + Sync + 'static {
    move |raw| Ok(options.split(raw).into_iter().map(str::to_owned).collect())
}

/// Build a cast splitting the raw value and applying `base` to every element.
///
/// Order is preserved and duplicates are kept. The first element `base`
/// rejects fails the whole cast.
pub fn list_cast<T, F>(
    base: F,
    options: ListOptions,
) -> impl Fn(&str) -> Result<Vec<T>, CastError> + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&str) -> Result<T, CastError> + Send + Sync + 'static,
{
    move |raw| options.split(raw).into_iter().map(&base).collect()
}

/// Like [`list_cast`], producing a fixed-length boxed slice.
pub fn tuple_cast<T, F>(
    base: F,
    options: ListOptions,
) -> impl Fn(&str) -> Result<Box<[T]>, CastError> + Send + Sync + 'static
where
    T: 'static,
    F: Fn(&str) -> Result<T, CastError> + Send + Sync + 'static,
{
    let cast = list_cast(base, options);
    move |raw| cast(raw).map(Vec::into_boxed_slice)
}

/// Case-insensitive boolean parsing over `1/true/yes/on` and `0/false/no/off`.
///
/// # Errors
///
/// Returns [`CastError::Lookup`] for any other token.
pub fn boolean_cast(raw: &str) -> Result<bool, CastError> {
    let token = raw.to_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        Ok(true)
    } else if FALSE_TOKENS.contains(&token.as_str()) {
        Ok(false)
    } else {
        Err(CastError::Lookup {
            value: raw.to_owned(),
            expected: format!("[{}, {}]", TRUE_TOKENS.join(", "), FALSE_TOKENS.join(", ")),
        })
    }
}

/// As [`boolean_cast`], but `none` and `unknown` (any case) yield `None`.
///
/// # Errors
///
/// Returns [`CastError::Lookup`] for any unrecognised token.
pub fn optional_boolean_cast(raw: &str) -> Result<Option<bool>, CastError> {
    let token = raw.to_lowercase();
    if UNKNOWN_TOKENS.contains(&token.as_str()) {
        return Ok(None);
    }
    boolean_cast(raw)
        .map(Some)
        .map_err(|_| CastError::Lookup {
            value: raw.to_owned(),
            expected: format!(
                "[{}, {}, {}]",
                TRUE_TOKENS.join(", "),
                FALSE_TOKENS.join(", "),
                UNKNOWN_TOKENS.join(", ")
            ),
        })
}
