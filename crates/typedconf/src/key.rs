//! Key and group-key declarations.
//!
//! A declaration is made once per config type, usually in a `static`, and is
//! shared by every instance of that type. Anything it memoizes (the inferred
//! key name) is therefore stored on the declaration, never on an instance.
//!
//! ```rust
//! use std::sync::{Arc, LazyLock};
//! use typedconf::{Config, ConfigContext, Field, Key, MemorySource, casts};
//!
//! static HOST: LazyLock<Key<String>> = LazyLock::new(|| Key::new("host"));
//! static PORT: LazyLock<Key<u16>> =
//!     LazyLock::new(|| Key::new("port").optional().cast(casts::parse::<u16>).default(5432));
//!
//! struct Database {
//!     ctx: ConfigContext,
//! }
//!
//! impl Database {
//!     fn host(&self) -> typedconf::ConfigResult<String> {
//!         HOST.require(self)
//!     }
//!
//!     fn port(&self) -> typedconf::ConfigResult<u16> {
//!         PORT.require(self)
//!     }
//! }
//!
//! impl Config for Database {
//!     fn from_context(ctx: ConfigContext) -> Self {
//!         Self { ctx }
//!     }
//!
//!     fn context(&self) -> &ConfigContext {
//!         &self.ctx
//!     }
//!
//!     fn fields(&self) -> Vec<Field> {
//!         vec![Field::Key(&*HOST), Field::Key(&*PORT)]
//!     }
//!
//!     fn default_section() -> Option<typedconf::SectionPath> {
//!         Some("database".into())
//!     }
//! }
//!
//! let db = Database::with_sources(vec![Arc::new(MemorySource::new([(
//!     "database",
//!     [("HOST", "db.internal")],
//! )]))]);
//! assert_eq!(db.host().unwrap(), "db.internal");
//! assert_eq!(db.port().unwrap(), 5432);
//! ```

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use crate::config::{Config, ConfigContext};
use crate::error::{CastError, ConfigError, ConfigResult};
use crate::section::SectionPath;

/// Anything a key can resolve to.
pub trait ConfigValue: Clone + fmt::Debug + Send + Sync + 'static {}

impl<T> ConfigValue for T where T: Clone + fmt::Debug + Send + Sync + 'static {}

type CastFn<T> = Box<dyn Fn(&str) -> Result<Option<T>, CastError> + Send + Sync>;

/// What an absent optional key falls back to.
enum Fallback<T> {
    None,
    /// Returned as-is.
    Typed(T),
    /// Run through the key's cast like a source value.
    Raw(String),
}

/// Declaration of a leaf configuration value.
pub struct Key<T> {
    attr: &'static str,
    section: Option<SectionPath>,
    explicit_key: Option<String>,
    inferred_key: OnceLock<String>,
    required: bool,
    has_cast: bool,
    cast: CastFn<T>,
    fallback: Fallback<T>,
}

impl Key<String> {
    /// Declare a required string key for the member named `attr`.
    ///
    /// Without [`key_name`](Self::key_name) the key is looked up under the
    /// uppercased member name.
    #[must_use]
    pub fn new(attr: &'static str) -> Self {
        Self {
            attr,
            section: None,
            explicit_key: None,
            inferred_key: OnceLock::new(),
            required: true,
            has_cast: false,
            cast: Box::new(|raw| Ok(Some(raw.to_owned()))),
            fallback: Fallback::None,
        }
    }

    /// Convert raw values with `cast`.
    ///
    /// A string default declared earlier becomes a raw default that is cast
    /// too.
    #[must_use]
    pub fn cast<U, F>(self, cast: F) -> Key<U>
    where
        U: ConfigValue,
        F: Fn(&str) -> Result<U, CastError> + Send + Sync + 'static,
    {
        self.cast_optional(move |raw| cast(raw).map(Some))
    }

    /// Convert raw values with a cast that may produce no value, such as
    /// [`optional_boolean_cast`](crate::casts::optional_boolean_cast).
    #[must_use]
    pub fn cast_optional<U, F>(self, cast: F) -> Key<U>
    where
        U: ConfigValue,
        F: Fn(&str) -> Result<Option<U>, CastError> + Send + Sync + 'static,
    {
        let fallback = match self.fallback {
            Fallback::None => Fallback::None,
            Fallback::Typed(raw) | Fallback::Raw(raw) => Fallback::Raw(raw),
        };
        Key {
            attr: self.attr,
            section: self.section,
            explicit_key: self.explicit_key,
            inferred_key: self.inferred_key,
            required: self.required,
            has_cast: true,
            cast: Box::new(cast),
            fallback,
        }
    }
}

impl<T: ConfigValue> Key<T> {
    /// Look the key up in `section` instead of the config's default section.
    #[must_use]
    pub fn section(mut self, section: impl Into<SectionPath>) -> Self {
        self.section = Some(section.into());
        self
    }

    /// Look the key up under `name` (uppercased) instead of the member name.
    #[must_use]
    pub fn key_name(mut self, name: impl AsRef<str>) -> Self {
        self.explicit_key = Some(name.as_ref().to_uppercase());
        self
    }

    /// Set whether a missing value is an error.
    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `required(false)`.
    #[must_use]
    pub fn optional(self) -> Self {
        self.required(false)
    }

    /// Value returned, uncast, when an optional key is absent from every
    /// source. Ignored for required keys.
    #[must_use]
    pub fn default(mut self, value: T) -> Self {
        self.fallback = Fallback::Typed(value);
        self
    }

    /// Raw string used, through the cast, when an optional key is absent
    /// from every source. Ignored for required keys.
    #[must_use]
    pub fn default_raw(mut self, raw: impl Into<String>) -> Self {
        self.fallback = Fallback::Raw(raw.into());
        self
    }

    /// The declared member name.
    #[must_use]
    pub fn attr(&self) -> &'static str {
        self.attr
    }

    /// Whether a missing value is an error.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether a cast other than the identity was declared.
    #[must_use]
    pub fn has_cast(&self) -> bool {
        self.has_cast
    }

    /// The resolved key name: the explicit one, else the uppercased member
    /// name, computed once per declaration.
    #[must_use]
    pub fn resolved_key_name(&self) -> &str {
        match &self.explicit_key {
            Some(name) => name,
            None => self.inferred_key.get_or_init(|| self.attr.to_uppercase()),
        }
    }

    /// The section the key resolves to for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoSection`] if neither the key nor the config
    /// names a section.
    pub fn resolved_section(&self, ctx: &ConfigContext) -> ConfigResult<SectionPath> {
        self.section
            .as_ref()
            .or_else(|| ctx.section())
            .cloned()
            .ok_or(ConfigError::NoSection { attr: self.attr })
    }

    /// Resolve the value for `config`.
    ///
    /// A cached value is returned without running the cast again. Otherwise
    /// the provider's sources are queried in order; an absent optional key
    /// falls back to its default. Values that end up `None` are not cached,
    /// so an absent optional key is looked up again on every access.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NoSection`] if no section can be resolved
    /// - [`ConfigError::MissingKey`] if a required key has no value
    /// - [`ConfigError::Cast`] if the cast rejects the raw value
    /// - [`ConfigError::TypeMismatch`] if the cache holds another type
    pub fn get<C: Config + ?Sized>(&self, config: &C) -> ConfigResult<Option<T>> {
        self.get_in(config.context())
    }

    /// Resolve the value, treating an absent optional value as missing.
    ///
    /// # Errors
    ///
    /// As [`get`](Self::get), plus [`ConfigError::MissingKey`] when the value
    /// resolves to `None`.
    pub fn require<C: Config + ?Sized>(&self, config: &C) -> ConfigResult<T> {
        let ctx = config.context();
        match self.get_in(ctx)? {
            Some(value) => Ok(value),
            None => Err(ConfigError::MissingKey {
                section: self.resolved_section(ctx)?,
                key: self.resolved_key_name().to_owned(),
            }),
        }
    }

    pub(crate) fn get_in(&self, ctx: &ConfigContext) -> ConfigResult<Option<T>> {
        let section = self.resolved_section(ctx)?;
        let key = self.resolved_key_name();
        let provider = ctx.provider();

        if let Some(cached) = provider.get_from_cache(&section, key) {
            return match cached.downcast_ref::<T>() {
                Some(value) => Ok(Some(value.clone())),
                None => Err(ConfigError::TypeMismatch {
                    section,
                    key: key.to_owned(),
                    expected: std::any::type_name::<T>(),
                }),
            };
        }

        let value = match provider.get_key(&section, key) {
            Some(raw) => self.apply_cast(&section, key, &raw)?,
            None if self.required => {
                return Err(ConfigError::MissingKey {
                    section,
                    key: key.to_owned(),
                });
            },
            None => match &self.fallback {
                Fallback::None => None,
                Fallback::Typed(value) => Some(value.clone()),
                Fallback::Raw(raw) => self.apply_cast(&section, key, raw)?,
            },
        };

        if let Some(value) = &value {
            provider.add_to_cache(section, key, Arc::new(value.clone()));
        }
        Ok(value)
    }

    fn apply_cast(&self, section: &SectionPath, key: &str, raw: &str) -> ConfigResult<Option<T>> {
        (self.cast)(raw).map_err(|source| ConfigError::Cast {
            section: section.clone(),
            key: key.to_owned(),
            source,
        })
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("attr", &self.attr)
            .field("section", &self.section)
            .field("key_name", &self.explicit_key)
            .field("required", &self.required)
            .field("has_cast", &self.has_cast)
            .finish_non_exhaustive()
    }
}

/// Declaration of a nested config reachable from its owner.
///
/// The child is created on first access, bound to the owner's provider, and
/// memoized on the owner. Each group key owns its own child instance, even
/// when two group keys share a child type.
pub struct GroupKey<C> {
    attr: &'static str,
    marker: PhantomData<fn() -> C>,
}

impl<C: Config> GroupKey<C> {
    /// Declare a group key for the member named `attr`.
    #[must_use]
    pub const fn new(attr: &'static str) -> Self {
        Self {
            attr,
            marker: PhantomData,
        }
    }

    /// The declared member name.
    #[must_use]
    pub fn attr(&self) -> &'static str {
        self.attr
    }

    /// The child config of `owner`, created on first access.
    pub fn get<P: Config + ?Sized>(&self, owner: &P) -> Arc<C> {
        self.get_in(owner.context())
    }

    fn get_in(&self, ctx: &ConfigContext) -> Arc<C> {
        ctx.child(self.attr, || Arc::new(C::with_provider(Arc::clone(ctx.provider()))))
    }
}

impl<C> fmt::Debug for GroupKey<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupKey")
            .field("attr", &self.attr)
            .field("config", &std::any::type_name::<C>())
            .finish()
    }
}

/// Type-erased view of a [`Key`], as listed in a config's manifest.
pub trait KeyField: Send + Sync {
    /// The declared member name.
    fn attr(&self) -> &'static str;

    /// Resolve the key and discard the value.
    ///
    /// # Errors
    ///
    /// Any error [`Key::get`] can return.
    fn resolve(&self, ctx: &ConfigContext) -> ConfigResult<()>;

    /// Resolve the key and render the value with `Debug` (`None` if absent).
    ///
    /// # Errors
    ///
    /// Any error [`Key::get`] can return.
    fn render(&self, ctx: &ConfigContext) -> ConfigResult<String>;

    /// Write `value` straight into the cache for this key.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NoSection`] if no section can be resolved, or
    /// [`ConfigError::InvalidOverride`] if `value` is not of the key's type.
    fn override_with(
        &self,
        ctx: &ConfigContext,
        config: &'static str,
        value: &Arc<dyn Any + Send + Sync>,
    ) -> ConfigResult<()>;
}

impl<T: ConfigValue> KeyField for Key<T> {
    fn attr(&self) -> &'static str {
        self.attr
    }

    fn resolve(&self, ctx: &ConfigContext) -> ConfigResult<()> {
        self.get_in(ctx).map(drop)
    }

    fn render(&self, ctx: &ConfigContext) -> ConfigResult<String> {
        Ok(match self.get_in(ctx)? {
            Some(value) => format!("{value:?}"),
            None => "None".to_owned(),
        })
    }

    fn override_with(
        &self,
        ctx: &ConfigContext,
        config: &'static str,
        value: &Arc<dyn Any + Send + Sync>,
    ) -> ConfigResult<()> {
        if !value.is::<T>() {
            return Err(ConfigError::InvalidOverride {
                config,
                attr: self.attr.to_owned(),
                reason: format!("expected a value of type {}", std::any::type_name::<T>()),
            });
        }
        let section = self.resolved_section(ctx)?;
        ctx.provider()
            .add_to_cache(section, self.resolved_key_name(), Arc::clone(value));
        Ok(())
    }
}

/// Type-erased view of a [`GroupKey`], as listed in a config's manifest.
pub trait GroupField: Send + Sync {
    /// The declared member name.
    fn attr(&self) -> &'static str;

    /// The memoized child config, created on first access.
    fn child(&self, ctx: &ConfigContext) -> Arc<dyn Config>;
}

impl<C: Config> GroupField for GroupKey<C> {
    fn attr(&self) -> &'static str {
        self.attr
    }

    fn child(&self, ctx: &ConfigContext) -> Arc<dyn Config> {
        self.get_in(ctx)
    }
}

/// One entry of a config type's manifest.
#[derive(Clone, Copy)]
pub enum Field {
    /// A leaf value.
    Key(&'static dyn KeyField),
    /// A nested config.
    Group(&'static dyn GroupField),
}

impl Field {
    /// The declared member name.
    #[must_use]
    pub fn attr(&self) -> &'static str {
        match self {
            Self::Key(key) => key.attr(),
            Self::Group(group) => group.attr(),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.debug_tuple("Key").field(&key.attr()).finish(),
            Self::Group(group) => f.debug_tuple("Group").field(&group.attr()).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casts;
    use crate::provider::ConfigProvider;
    use crate::source::{ConfigSource, MemorySource};

    fn context(section: Option<&str>, sources: Vec<Arc<dyn ConfigSource>>) -> ConfigContext {
        ConfigContext::new(
            Arc::new(ConfigProvider::with_sources(sources)),
            section.map(SectionPath::from),
        )
    }

    fn memory(key: &str, value: &str) -> Arc<dyn ConfigSource> {
        Arc::new(MemorySource::new([("s", [(key, value)])]))
    }

    #[test]
    fn test_key_name_inferred_once() {
        let key = Key::new("prop1").section("s");
        assert!(key.inferred_key.get().is_none());
        assert_eq!(key.resolved_key_name(), "PROP1");
        assert_eq!(key.inferred_key.get().map(String::as_str), Some("PROP1"));

        let key = Key::new("prop1").key_name("other");
        assert_eq!(key.resolved_key_name(), "OTHER");
    }

    #[test]
    fn test_key_getter_table() {
        // (source value, declaration, expected outcome)
        let present = || vec![memory("PROP1", "3")];
        let absent = Vec::new;

        let plain = Key::new("prop").section("s").key_name("prop1");
        assert!(plain.is_required());
        assert!(!plain.has_cast());
        assert_eq!(plain.get_in(&context(None, present())).unwrap().as_deref(), Some("3"));
        assert!(matches!(
            plain.get_in(&context(None, absent())),
            Err(ConfigError::MissingKey { .. })
        ));

        let optional = Key::new("prop").section("s").key_name("prop1").optional();
        assert!(!optional.is_required());
        assert_eq!(optional.get_in(&context(None, present())).unwrap().as_deref(), Some("3"));
        assert_eq!(optional.get_in(&context(None, absent())).unwrap(), None);

        let int = Key::new("prop").section("s").key_name("prop1").cast(casts::parse::<i64>);
        assert!(int.has_cast());
        assert_eq!(int.get_in(&context(None, present())).unwrap(), Some(3));
        assert!(matches!(
            int.get_in(&context(None, vec![memory("PROP1", "a")])),
            Err(ConfigError::Cast { .. })
        ));

        // A default on a required key is never used.
        let required_default = Key::new("prop")
            .section("s")
            .key_name("prop1")
            .default("5".to_owned());
        assert!(matches!(
            required_default.get_in(&context(None, absent())),
            Err(ConfigError::MissingKey { .. })
        ));
        assert_eq!(
            required_default.get_in(&context(None, present())).unwrap().as_deref(),
            Some("3")
        );

        let optional_default = Key::new("prop")
            .section("s")
            .key_name("prop1")
            .optional()
            .cast(casts::parse::<i64>)
            .default(3);
        assert_eq!(optional_default.get_in(&context(None, absent())).unwrap(), Some(3));
        assert_eq!(optional_default.get_in(&context(None, present())).unwrap(), Some(3));
    }

    #[test]
    fn test_raw_default_is_cast() {
        let key = Key::new("flag")
            .section("s")
            .optional()
            .default_raw("yes")
            .cast(casts::boolean_cast);
        assert_eq!(key.get_in(&context(None, Vec::new())).unwrap(), Some(true));

        // A string default declared before the cast is cast as well.
        let key = Key::new("count")
            .section("s")
            .optional()
            .default("7".to_owned())
            .cast(casts::parse::<u8>);
        assert_eq!(key.get_in(&context(None, Vec::new())).unwrap(), Some(7));

        let key = Key::new("count")
            .section("s")
            .optional()
            .default_raw("seven")
            .cast(casts::parse::<u8>);
        assert!(matches!(
            key.get_in(&context(None, Vec::new())),
            Err(ConfigError::Cast { .. })
        ));
    }

    #[test]
    fn test_optional_cast_result_is_not_cached() {
        let key = Key::new("tri")
            .section("s")
            .cast_optional(casts::optional_boolean_cast);
        let ctx = context(None, vec![memory("TRI", "unknown")]);
        assert_eq!(key.get_in(&ctx).unwrap(), None);
        assert!(
            ctx.provider()
                .get_from_cache(&SectionPath::from("s"), "TRI")
                .is_none()
        );
    }

    #[test]
    fn test_section_resolution() {
        let key = Key::new("k");
        assert!(matches!(
            key.get_in(&context(None, Vec::new())),
            Err(ConfigError::NoSection { attr: "k" })
        ));

        let ctx = context(Some("s"), vec![memory("K", "v")]);
        assert_eq!(key.get_in(&ctx).unwrap().as_deref(), Some("v"));

        // An explicit section beats the config's section.
        let explicit = Key::new("k").section("t");
        assert_eq!(
            explicit.resolved_section(&ctx).unwrap(),
            SectionPath::from("t")
        );
    }

    #[test]
    fn test_cached_type_mismatch() {
        let ctx = context(Some("s"), vec![memory("K", "1")]);
        let as_string = Key::new("k");
        let as_int = Key::new("k").cast(casts::parse::<i32>);

        assert_eq!(as_string.get_in(&ctx).unwrap().as_deref(), Some("1"));
        assert!(matches!(
            as_int.get_in(&ctx),
            Err(ConfigError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_override_type_checked() {
        let ctx = context(Some("s"), Vec::new());
        let key = Key::new("k").cast(casts::parse::<i32>);

        let wrong: Arc<dyn Any + Send + Sync> = Arc::new("text".to_owned());
        assert!(matches!(
            key.override_with(&ctx, "Sample", &wrong),
            Err(ConfigError::InvalidOverride { .. })
        ));

        let right: Arc<dyn Any + Send + Sync> = Arc::new(9_i32);
        key.override_with(&ctx, "Sample", &right).unwrap();
        assert_eq!(key.get_in(&ctx).unwrap(), Some(9));
    }

    #[test]
    fn test_render() {
        let ctx = context(Some("s"), vec![memory("K", "v")]);
        assert_eq!(Key::new("k").render(&ctx).unwrap(), "\"v\"");
        assert_eq!(Key::new("missing").optional().render(&ctx).unwrap(), "None");
    }
}
