//! Typed views over the test runner config and the workspace manifests.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::PluginOptions;

/// File name of the workspace manifest, read from the workspace root.
pub const WORKSPACE_MANIFEST: &str = "nx.json";
/// File name of a project manifest, read from a project root.
pub const PROJECT_MANIFEST: &str = "project.json";

/// One glob or an ordered list of globs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Patterns::One(pattern) => std::slice::from_ref(pattern),
            Patterns::Many(patterns) => patterns,
        };
        slice.iter().map(String::as_str)
    }
}

/// Plugin presets a config can carry for the e2e testing type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginPresetOptions {
    #[serde(default)]
    pub web_server_commands: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub ci_web_server_command: Option<String>,
}

impl PluginPresetOptions {
    /// Extracts preset keys from a free-form `env` block.
    ///
    /// Values of the wrong shape are ignored.
    pub fn from_env(env: &IndexMap<String, Value>) -> Self {
        let web_server_commands = env
            .get("webServerCommands")
            .and_then(Value::as_object)
            .map(|commands| {
                commands
                    .iter()
                    .filter_map(|(name, command)| {
                        command.as_str().map(|c| (name.clone(), c.to_string()))
                    })
                    .collect()
            });
        let ci_web_server_command = env
            .get("ciWebServerCommand")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            web_server_commands,
            ci_web_server_command,
        }
    }

    /// Overlays `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: PluginPresetOptions) -> Self {
        Self {
            web_server_commands: other.web_server_commands.or(self.web_server_commands),
            ci_web_server_command: other.ci_web_server_command.or(self.ci_web_server_command),
        }
    }
}

/// Settings for one testing type (`e2e` or `component`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestingTypeConfig {
    #[serde(default)]
    pub spec_pattern: Option<Patterns>,
    #[serde(default)]
    pub exclude_spec_pattern: Option<Patterns>,
    #[serde(default)]
    pub videos_folder: Option<String>,
    #[serde(default)]
    pub screenshots_folder: Option<String>,
    #[serde(default)]
    pub env: IndexMap<String, Value>,
    #[serde(default)]
    pub nx_plugin_options: Option<PluginPresetOptions>,
}

/// The parts of a test runner config that target synthesis reads.
///
/// Unknown fields are ignored so any valid config loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunnerConfig {
    #[serde(default)]
    pub videos_folder: Option<String>,
    #[serde(default)]
    pub screenshots_folder: Option<String>,
    #[serde(default)]
    pub env: IndexMap<String, Value>,
    #[serde(default)]
    pub e2e: Option<TestingTypeConfig>,
    #[serde(default)]
    pub component: Option<TestingTypeConfig>,
}

/// Which testing type a set of targets is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestingType {
    E2e,
    Component,
}

impl TestRunnerConfig {
    pub fn testing_type(&self, testing_type: TestingType) -> Option<&TestingTypeConfig> {
        match testing_type {
            TestingType::E2e => self.e2e.as_ref(),
            TestingType::Component => self.component.as_ref(),
        }
    }

    /// Resolves plugin presets, layering `e2e.nxPluginOptions`, then the
    /// top-level `env`, then `e2e.env`.
    pub fn plugin_presets(&self) -> PluginPresetOptions {
        let from_plugin_options = self
            .e2e
            .as_ref()
            .and_then(|e2e| e2e.nx_plugin_options.clone())
            .unwrap_or_default();
        let from_e2e_env = self
            .e2e
            .as_ref()
            .map(|e2e| PluginPresetOptions::from_env(&e2e.env))
            .unwrap_or_default();

        from_plugin_options
            .merge(PluginPresetOptions::from_env(&self.env))
            .merge(from_e2e_env)
    }
}

/// A registered plugin, either by bare name or with options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginEntry {
    Name(String),
    Configured {
        plugin: String,
        #[serde(default)]
        options: Option<Value>,
    },
}

impl PluginEntry {
    pub fn name(&self) -> &str {
        match self {
            PluginEntry::Name(name) => name,
            PluginEntry::Configured { plugin, .. } => plugin,
        }
    }
}

/// Workspace-level manifest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub named_inputs: IndexMap<String, Value>,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,
}

impl WorkspaceConfig {
    /// Reads the workspace manifest. A missing file yields the defaults.
    pub fn load(workspace_root: &Path) -> Result<Self> {
        let path = workspace_root.join(WORKSPACE_MANIFEST);
        if !path.exists() {
            debug!(path = %path.display(), "no workspace manifest, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|error| Error::Json {
            error,
            context: WORKSPACE_MANIFEST.to_string(),
        })
    }

    /// Whether `plugin_name` appears in the `plugins` list.
    pub fn has_plugin(&self, plugin_name: &str) -> bool {
        self.plugins.iter().any(|entry| entry.name() == plugin_name)
    }

    /// Options registered for `plugin_name`, if any parse.
    pub fn plugin_options(&self, plugin_name: &str) -> Option<PluginOptions> {
        self.plugins.iter().find_map(|entry| match entry {
            PluginEntry::Configured {
                plugin,
                options: Some(options),
            } if plugin == plugin_name => serde_json::from_value(options.clone()).ok(),
            _ => None,
        })
    }
}

/// Project-level manifest. Only named inputs are read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectManifest {
    #[serde(default)]
    pub named_inputs: IndexMap<String, Value>,
}

impl ProjectManifest {
    /// Reads `project.json` from `project_dir`, if present and well formed.
    pub fn load(project_dir: &Path) -> Option<Self> {
        let path = project_dir.join(PROJECT_MANIFEST);
        let content = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "ignoring unreadable project manifest");
                None
            }
        }
    }
}
