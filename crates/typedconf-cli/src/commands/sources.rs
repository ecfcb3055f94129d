//! Source stacking and the `sources` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use typedconf::{ConfigProvider, ConfigSource, EnvironmentSource, IniFileSource};

use crate::StackArgs;

/// Build a provider from the stacking flags: environment first, then the
/// required INI files in order, then the optional ones.
pub(crate) fn build_provider(stack: &StackArgs) -> Result<Arc<ConfigProvider>> {
    let mut sources: Vec<Arc<dyn ConfigSource>> = Vec::new();

    if let Some(prefix) = &stack.env_prefix {
        sources.push(Arc::new(EnvironmentSource::new(prefix.clone())));
    }

    let files = stack
        .ini
        .iter()
        .map(|path| (path, true))
        .chain(stack.ini_optional.iter().map(|path| (path, false)));
    for (path, must_exist) in files {
        let source = IniFileSource::loader(path)
            .encoding(stack.encoding.clone())
            .must_exist(must_exist)
            .load()
            .with_context(|| format!("failed to load {}", path.display()))?;
        sources.push(Arc::new(source));
    }

    debug!(count = sources.len(), "stacked config sources");
    Ok(Arc::new(ConfigProvider::with_sources(sources)))
}

/// One line per source, highest precedence first.
pub(crate) fn describe(provider: &ConfigProvider) -> Vec<String> {
    provider
        .config_sources()
        .iter()
        .map(ToString::to_string)
        .collect()
}
