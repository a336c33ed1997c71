//! Plugin options and their normalization.

use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_NAME: &str = "e2e";
pub const DEFAULT_COMPONENT_TESTING_TARGET_NAME: &str = "component-test";
pub const DEFAULT_CI_TARGET_NAME: &str = "e2e-ci";

/// Options supplied when the plugin is registered.
///
/// Every field is optional; [`PluginOptions::normalize`] fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    #[serde(default)]
    pub target_name: Option<String>,
    #[serde(default)]
    pub component_testing_target_name: Option<String>,
    #[serde(default)]
    pub ci_target_name: Option<String>,
}

/// Plugin options with every default applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedOptions {
    pub target_name: String,
    pub component_testing_target_name: String,
    pub ci_target_name: String,
}

impl PluginOptions {
    /// Returns a copy with defaults applied. `self` is left untouched.
    pub fn normalize(&self) -> NormalizedOptions {
        NormalizedOptions {
            target_name: self
                .target_name
                .clone()
                .unwrap_or_else(|| DEFAULT_TARGET_NAME.to_string()),
            component_testing_target_name: self
                .component_testing_target_name
                .clone()
                .unwrap_or_else(|| DEFAULT_COMPONENT_TESTING_TARGET_NAME.to_string()),
            ci_target_name: self
                .ci_target_name
                .clone()
                .unwrap_or_else(|| DEFAULT_CI_TARGET_NAME.to_string()),
        }
    }

    /// Fills fields that are unset in `self` from `fallback`.
    pub fn or(self, fallback: PluginOptions) -> PluginOptions {
        PluginOptions {
            target_name: self.target_name.or(fallback.target_name),
            component_testing_target_name: self
                .component_testing_target_name
                .or(fallback.component_testing_target_name),
            ci_target_name: self.ci_target_name.or(fallback.ci_target_name),
        }
    }
}

impl Default for NormalizedOptions {
    fn default() -> Self {
        PluginOptions::default().normalize()
    }
}
