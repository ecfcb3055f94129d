//! Config types: the [`Config`] trait and the per-instance [`ConfigContext`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::key::Field;
use crate::overrides::{Override, Overrides};
use crate::provider::ConfigProvider;
use crate::section::SectionPath;
use crate::source::ConfigSource;

/// State every config instance carries: its provider, its section and the
/// child configs created through its group keys.
pub struct ConfigContext {
    section: Option<SectionPath>,
    provider: Arc<ConfigProvider>,
    children: Mutex<HashMap<&'static str, Arc<dyn Any + Send + Sync>>>,
}

impl ConfigContext {
    /// Bind an instance to `provider`, reading keys without an explicit
    /// section from `section`.
    #[must_use]
    pub fn new(provider: Arc<ConfigProvider>, section: Option<SectionPath>) -> Self {
        Self {
            section,
            provider,
            children: Mutex::new(HashMap::new()),
        }
    }

    /// The provider this instance reads through.
    #[must_use]
    pub fn provider(&self) -> &Arc<ConfigProvider> {
        &self.provider
    }

    /// The instance's default section, if any.
    #[must_use]
    pub fn section(&self) -> Option<&SectionPath> {
        self.section.as_ref()
    }

    /// The child memoized under `attr`, or a fresh one from `make`.
    pub(crate) fn child<C: Config>(
        &self,
        attr: &'static str,
        make: impl FnOnce() -> Arc<C>,
    ) -> Arc<C> {
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = children.get(attr)
            && let Ok(child) = Arc::clone(existing).downcast::<C>()
        {
            return child;
        }
        debug!(attr, config = std::any::type_name::<C>(), "creating child config");
        let child = make();
        children.insert(attr, Arc::clone(&child) as Arc<dyn Any + Send + Sync>);
        child
    }
}

impl fmt::Debug for ConfigContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children = self
            .children
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("ConfigContext")
            .field("section", &self.section)
            .field("provider", &self.provider)
            .field("children", &children)
            .finish()
    }
}

/// A typed configuration type.
///
/// Implementors hold a [`ConfigContext`] and list their key and group-key
/// declarations in [`fields`](Self::fields). Everything else is provided.
pub trait Config: Send + Sync + 'static {
    /// Build an instance around `ctx`.
    fn from_context(ctx: ConfigContext) -> Self
    where
        Self: Sized;

    /// The instance's context.
    fn context(&self) -> &ConfigContext;

    /// Every declared key and group key, in declaration order.
    fn fields(&self) -> Vec<Field>;

    /// Section used by keys that do not name their own.
    fn default_section() -> Option<SectionPath>
    where
        Self: Sized,
    {
        None
    }

    /// Called by [`read`](Self::read) once this config's own keys resolved.
    /// The returned overrides replace cached values.
    ///
    /// # Errors
    ///
    /// Errors are propagated out of [`read`](Self::read).
    fn post_read_hook(&self) -> ConfigResult<Overrides> {
        Ok(Overrides::new())
    }

    /// Short type name used by [`describe`](Self::describe) and in errors.
    fn type_name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let path = full.split('<').next().unwrap_or(full);
        path.rsplit("::").next().unwrap_or(path)
    }

    /// An instance with its own provider and no sources.
    #[must_use]
    fn new() -> Self
    where
        Self: Sized,
    {
        Self::with_provider(Arc::new(ConfigProvider::new()))
    }

    /// An instance reading through a shared `provider`.
    #[must_use]
    fn with_provider(provider: Arc<ConfigProvider>) -> Self
    where
        Self: Sized,
    {
        Self::from_context(ConfigContext::new(provider, Self::default_section()))
    }

    /// An instance with its own provider holding `sources`.
    #[must_use]
    fn with_sources(sources: Vec<Arc<dyn ConfigSource>>) -> Self
    where
        Self: Sized,
    {
        Self::with_provider(Arc::new(ConfigProvider::with_sources(sources)))
    }

    /// An instance reading through `provider` with `section` as its default
    /// section, whatever the type declares.
    #[must_use]
    fn with_section(provider: Arc<ConfigProvider>, section: impl Into<SectionPath>) -> Self
    where
        Self: Sized,
    {
        Self::from_context(ConfigContext::new(provider, Some(section.into())))
    }

    /// The provider this instance reads through.
    fn provider(&self) -> &Arc<ConfigProvider> {
        self.context().provider()
    }

    /// The instance's default section, if any.
    fn section_name(&self) -> Option<&SectionPath> {
        self.context().section()
    }

    /// Snapshot of the provider's sources.
    fn config_sources(&self) -> Vec<Arc<dyn ConfigSource>> {
        self.provider().config_sources()
    }

    /// Append a source to the provider.
    fn add_source(&self, source: Arc<dyn ConfigSource>) {
        self.provider().add_source(source);
    }

    /// Replace the provider's sources.
    fn set_sources(&self, sources: Vec<Arc<dyn ConfigSource>>) {
        self.provider().set_sources(sources);
    }

    /// Swap one of the provider's sources for another.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SourceNotFound`] if `old` is not held.
    fn replace_source(
        &self,
        old: &Arc<dyn ConfigSource>,
        new: Arc<dyn ConfigSource>,
    ) -> ConfigResult<()> {
        self.provider().replace_source(old, new)
    }

    /// Raw lookup through the provider, bypassing declarations and cache.
    fn get_key(&self, section: &SectionPath, key: &str) -> Option<String> {
        self.provider().get_key(section, key)
    }

    /// Drop every cached value of the provider.
    ///
    /// The cache is shared, so this affects every config using the provider.
    fn clear_cache(&self) {
        self.provider().clear_cache();
    }

    /// Names of the declared keys (not group keys).
    fn registered_properties(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter_map(|field| match field {
                Field::Key(key) => Some(key.attr()),
                Field::Group(_) => None,
            })
            .collect()
    }

    /// Child configs of the declared group keys, in declaration order.
    fn composed_configs(&self) -> Vec<Arc<dyn Config>> {
        let ctx = self.context();
        self.fields()
            .into_iter()
            .filter_map(|field| match field {
                Field::Key(_) => None,
                Field::Group(group) => Some(group.child(ctx)),
            })
            .collect()
    }

    /// Resolve every key of this config and its children, failing on the
    /// first error.
    ///
    /// Own keys resolve first, then [`post_read_hook`](Self::post_read_hook)
    /// runs and its overrides are applied, then each child is read. A child's
    /// own hook therefore has the last word over its parent's overrides.
    ///
    /// # Errors
    ///
    /// The first resolution error, or [`ConfigError::InvalidOverride`] if the
    /// hook returns an override that does not fit a declaration.
    fn read(&self) -> ConfigResult<()> {
        let ctx = self.context();
        let fields = self.fields();
        debug!(config = self.type_name(), "reading config");

        for field in &fields {
            if let Field::Key(key) = field {
                key.resolve(ctx)?;
            }
        }

        let overrides = self.post_read_hook()?;
        self.apply_overrides(&overrides)?;

        for field in &fields {
            if let Field::Group(group) = field {
                group.child(ctx).read()?;
            }
        }
        Ok(())
    }

    /// Write `overrides` into the cache, descending into children for
    /// nested entries. Children's hooks are not run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOverride`] for a name that is not
    /// declared, a nested entry for a key, a value for a group key, or a
    /// value of the wrong type.
    fn apply_overrides(&self, overrides: &Overrides) -> ConfigResult<()> {
        let ctx = self.context();
        let fields = self.fields();
        let config = self.type_name();

        for (attr, entry) in overrides.iter() {
            let invalid = |reason: &str| ConfigError::InvalidOverride {
                config,
                attr: attr.to_owned(),
                reason: reason.to_owned(),
            };
            let field = fields
                .iter()
                .find(|field| field.attr() == attr)
                .ok_or_else(|| invalid("no such key or group key"))?;

            match (field, entry) {
                (Field::Key(key), Override::Value(value)) => {
                    debug!(config, attr, "applying override");
                    key.override_with(ctx, config, value)?;
                },
                (Field::Group(group), Override::Nested(nested)) => {
                    group.child(ctx).apply_overrides(nested)?;
                },
                (Field::Key(_), Override::Nested(_)) => {
                    return Err(invalid("a key takes a value, not nested overrides"));
                },
                (Field::Group(_), Override::Value(_)) => {
                    return Err(invalid("a group key takes nested overrides, not a value"));
                },
            }
        }
        Ok(())
    }

    /// Render the config as `TypeName(key=value, group=Child(...))`,
    /// resolving every key on the way.
    ///
    /// # Errors
    ///
    /// The first resolution error.
    fn describe(&self) -> ConfigResult<String> {
        let ctx = self.context();
        let mut parts = Vec::new();
        for field in self.fields() {
            let rendered = match field {
                Field::Key(key) => key.render(ctx)?,
                Field::Group(group) => group.child(ctx).describe()?,
            };
            parts.push(format!("{}={rendered}", field.attr()));
        }
        Ok(format!("{}({})", self.type_name(), parts.join(", ")))
    }
}
