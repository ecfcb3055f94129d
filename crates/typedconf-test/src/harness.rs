//! Test harness helpers.

use std::path::PathBuf;

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Set up tracing for tests with the given filter.
///
/// Safe to call from several tests; only the first call installs a
/// subscriber.
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// A temporary directory holding one config file.
///
/// The directory and file are removed when this value is dropped.
#[derive(Debug)]
pub struct TempConfigFile {
    dir: TempDir,
    path: PathBuf,
}

impl TempConfigFile {
    /// Write `contents` to a file called `name` in a fresh temporary
    /// directory.
    ///
    /// # Panics
    ///
    /// Panics if the directory or file cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new(name: &str, contents: impl AsRef<[u8]>) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join(name);
        std::fs::write(&path, contents).expect("failed to write temp config file");
        Self { dir, path }
    }

    /// Path of the file.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Path of a file in the same directory that does not exist.
    #[must_use]
    pub fn missing_sibling(&self) -> PathBuf {
        self.dir.path().join("does-not-exist.cfg")
    }
}
