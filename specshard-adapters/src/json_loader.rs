use std::path::Path;

use async_trait::async_trait;
use specshard_core::config::TestRunnerConfig;
use specshard_core::error::{Error, Result};
use specshard_core::loader::ConfigLoader;
use tracing::debug;

pub struct JsonLoader;

#[async_trait]
impl ConfigLoader for JsonLoader {
    fn format(&self) -> &'static str {
        "json"
    }

    fn supports(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("json")
    }

    async fn load(&self, path: &Path) -> Result<TestRunnerConfig> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::ConfigLoad {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let config = serde_json::from_str(&content).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: format!("invalid JSON: {}", e),
        })?;

        debug!(path = %path.display(), "loaded JSON test runner config");
        Ok(config)
    }
}
