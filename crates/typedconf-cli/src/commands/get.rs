//! The `get` command: resolve one key through a declaration.

use std::fmt::Display;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, ValueEnum};
use typedconf::{Config, ConfigContext, ConfigProvider, ConfigValue, Field, Key, SectionPath, casts};

/// Arguments of `typedconf get`.
#[derive(Args, Debug)]
pub(crate) struct GetArgs {
    /// Section to read, nested sections separated by `.`
    pub(crate) section: String,

    /// Key to read
    pub(crate) key: String,

    /// How to interpret the raw value
    #[arg(long, value_enum, default_value_t = CastKind::Str)]
    pub(crate) cast: CastKind,

    /// Raw value used (and cast) when no source has the key
    #[arg(long)]
    pub(crate) default: Option<String>,
}

/// Casts selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CastKind {
    /// The raw string
    Str,
    /// A signed integer
    Int,
    /// A floating point number
    Float,
    /// `1/true/yes/on` or `0/false/no/off`
    Bool,
    /// As `bool`, plus `none` and `unknown`
    OptionalBool,
    /// Comma-separated strings, one per output line
    List,
}

/// A config with no declarations of its own, used to resolve ad hoc keys.
struct AdHocConfig {
    ctx: ConfigContext,
}

impl Config for AdHocConfig {
    fn from_context(ctx: ConfigContext) -> Self {
        Self { ctx }
    }

    fn context(&self) -> &ConfigContext {
        &self.ctx
    }

    fn fields(&self) -> Vec<Field> {
        Vec::new()
    }
}

/// Resolve the requested key and render it for printing.
pub(crate) fn run(provider: Arc<ConfigProvider>, args: &GetArgs) -> Result<String> {
    let section = SectionPath::new(args.section.split('.'));
    let adhoc = AdHocConfig::with_section(provider, section.clone());

    let key = Key::new("value").section(section).key_name(&args.key);
    let key = match &args.default {
        Some(raw) => key.optional().default_raw(raw.as_str()),
        None => key,
    };

    let rendered = match args.cast {
        CastKind::Str => render(&adhoc, &key)?,
        CastKind::Int => render(&adhoc, &key.cast(casts::parse::<i64>))?,
        CastKind::Float => render(&adhoc, &key.cast(casts::parse::<f64>))?,
        CastKind::Bool => render(&adhoc, &key.cast(casts::boolean_cast))?,
        CastKind::OptionalBool => {
            render(&adhoc, &key.cast_optional(casts::optional_boolean_cast))?
        },
        CastKind::List => key
            .cast(casts::string_list_cast(casts::ListOptions::default()))
            .get(&adhoc)?
            .map(|items| items.join("\n")),
    };
    Ok(rendered.unwrap_or_else(|| "None".to_owned()))
}

fn render<T: ConfigValue + Display>(adhoc: &AdHocConfig, key: &Key<T>) -> Result<Option<String>> {
    Ok(key.get(adhoc)?.map(|value| value.to_string()))
}
