//! Config loader trait for evaluating test runner config files.

use std::path::Path;

use async_trait::async_trait;

use crate::config::TestRunnerConfig;
use crate::error::Result;

/// Loads a test runner config file into its typed view.
///
/// Loading may run arbitrary work, so it is async; synthesis awaits it and
/// never starts before it completes.
#[async_trait]
pub trait ConfigLoader: Send + Sync {
    /// Human readable format name, e.g. `"json"`.
    fn format(&self) -> &'static str;

    /// Whether this loader understands `path`.
    fn supports(&self, path: &Path) -> bool;

    /// Loads and validates the config at `path`.
    ///
    /// # Errors
    ///
    /// Syntax and shape errors are returned unmodified; callers do not recover.
    async fn load(&self, path: &Path) -> Result<TestRunnerConfig>;
}
