#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Typed, declarative configuration for Rust programs.
//!
//! A config type declares its values once, as [`Key`] and [`GroupKey`]
//! statics, and reads them through a shared [`ConfigProvider`] that holds an
//! ordered list of [`ConfigSource`]s and a cache of resolved values.
//!
//! # Usage
//!
//! ```rust
//! use std::sync::{Arc, LazyLock};
//! use typedconf::{Config, ConfigContext, Field, Key, MemorySource, casts};
//!
//! static WORKERS: LazyLock<Key<usize>> =
//!     LazyLock::new(|| Key::new("workers").cast(casts::parse::<usize>));
//!
//! struct Server {
//!     ctx: ConfigContext,
//! }
//!
//! impl Config for Server {
//!     fn from_context(ctx: ConfigContext) -> Self {
//!         Self { ctx }
//!     }
//!
//!     fn context(&self) -> &ConfigContext {
//!         &self.ctx
//!     }
//!
//!     fn fields(&self) -> Vec<Field> {
//!         vec![Field::Key(&*WORKERS)]
//!     }
//!
//!     fn default_section() -> Option<typedconf::SectionPath> {
//!         Some("server".into())
//!     }
//! }
//!
//! let server = Server::with_sources(vec![Arc::new(MemorySource::new([(
//!     "server",
//!     [("WORKERS", "8")],
//! )]))]);
//! server.read().unwrap();
//! assert_eq!(WORKERS.require(&server).unwrap(), 8);
//! ```
//!
//! # Precedence
//!
//! Sources are consulted in list order and the first one that knows a key
//! wins. A resolved value is cached per `(section, key)` until
//! [`Config::clear_cache`] is called, so later source changes are invisible
//! until then.

/// Reusable cast functions.
pub mod casts;
/// Config types and per-instance state.
pub mod config;
/// Configuration error types.
pub mod error;
/// Key and group-key declarations.
pub mod key;
/// Post-read overrides.
pub mod overrides;
/// The shared source list and value cache.
pub mod provider;
/// Section paths.
pub mod section;
/// Config sources.
pub mod source;

pub use config::{Config, ConfigContext};
pub use error::{CastError, ConfigError, ConfigResult};
pub use key::{ConfigValue, Field, GroupField, GroupKey, Key, KeyField};
pub use overrides::{Override, Overrides};
pub use provider::{CachedValue, ConfigProvider};
pub use section::SectionPath;
pub use source::{
    CommandLineSource, ConfigSource, EnvironmentSource, IniFileLoader, IniFileSource,
    IniStringSource, MemorySource,
};
