//! Shared test utilities for typedconf.
//!
//! This crate provides instrumented sources and fixture helpers that can be
//! used across the typedconf crates as a dev-dependency.
//!
//! # Usage
//!
//! ```rust,ignore
//! use typedconf_test::{CountingSource, memory_source};
//!
//! let counting = CountingSource::wrap(memory_source([("s", [("A", "1")])]));
//! // ... resolve keys through a provider holding `counting` ...
//! assert_eq!(counting.call_count(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
