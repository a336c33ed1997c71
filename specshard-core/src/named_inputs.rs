//! Named input resolution for synthesized targets.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;

use crate::config::{ProjectManifest, WorkspaceConfig};
use crate::target::InputSpec;

/// Package whose installed version invalidates every synthesized target.
pub const TEST_RUNNER_PACKAGE: &str = "cypress";

/// Named inputs visible to a project: the workspace's, overridden by the
/// project manifest's.
pub fn resolve_named_inputs(
    workspace: &WorkspaceConfig,
    workspace_root: &Path,
    project_root: &str,
) -> IndexMap<String, Value> {
    let mut named_inputs = workspace.named_inputs.clone();

    if let Some(manifest) = ProjectManifest::load(&workspace_root.join(project_root)) {
        named_inputs.extend(manifest.named_inputs);
    }

    named_inputs
}

/// Inputs shared by every synthesized target.
///
/// Dependencies contribute their `production` group when one is defined,
/// otherwise their `default` group.
pub fn inputs_for(named_inputs: &IndexMap<String, Value>) -> Vec<InputSpec> {
    let dependency_group = if named_inputs.contains_key("production") {
        "^production"
    } else {
        "^default"
    };

    vec![
        InputSpec::named("default"),
        InputSpec::named(dependency_group),
        InputSpec::external([TEST_RUNNER_PACKAGE]),
    ]
}
