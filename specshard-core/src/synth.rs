//! Synthesis of the primary run target and the component-test target.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::config::{TestRunnerConfig, TestingType};
use crate::error::Result;
use crate::fanout::fan_out;
use crate::file_index::FileIndex;
use crate::named_inputs::inputs_for;
use crate::options::NormalizedOptions;
use crate::path_utils;
use crate::target::{TargetConfiguration, TargetSet, TargetSpec, Targets};

pub const RUN_COMMAND: &str = "cypress run";
pub const COMPONENT_COMMAND: &str = "cypress run --component";

/// Web server command key that never becomes a configuration.
pub const RESERVED_WEB_SERVER_COMMAND: &str = "default";

/// Everything synthesis needs besides the config itself.
pub struct SynthesisContext<'a> {
    /// Project root relative to the workspace root, `/`-separated.
    pub project_root: &'a str,
    pub options: &'a NormalizedOptions,
    pub named_inputs: &'a IndexMap<String, Value>,
    pub file_index: &'a dyn FileIndex,
}

/// Derives every target a test runner config implies.
///
/// A config declaring neither `e2e` nor `component` yields an empty set.
///
/// # Errors
///
/// Returns an error only if spec file enumeration fails during CI fan-out.
pub fn build_targets(config: &TestRunnerConfig, ctx: &SynthesisContext<'_>) -> Result<TargetSet> {
    let mut targets = Targets::new();
    let mut ci_testing_group = None;
    let inputs = inputs_for(ctx.named_inputs);

    if let Some(e2e) = &config.e2e {
        let outputs = outputs_for(ctx.project_root, config, TestingType::E2e);
        let presets = config.plugin_presets();

        let mut target = TargetSpec::runnable(
            RUN_COMMAND,
            ctx.project_root,
            inputs.clone(),
            outputs.clone(),
        );
        target.configurations = web_server_configurations(presets.web_server_commands.as_ref());
        targets.insert(ctx.options.target_name.clone(), target);

        if let Some(ci_command) = presets.ci_web_server_command.as_deref() {
            ci_testing_group = fan_out(e2e, ci_command, ctx, &inputs, &outputs, &mut targets)?;
        } else {
            debug!(project = ctx.project_root, "no CI web server command, skipping fan-out");
        }
    }

    if config.component.is_some() {
        // An e2e target with the same name wins.
        targets
            .entry(ctx.options.component_testing_target_name.clone())
            .or_insert_with(|| {
                TargetSpec::runnable(
                    COMPONENT_COMMAND,
                    ctx.project_root,
                    inputs.clone(),
                    outputs_for(ctx.project_root, config, TestingType::Component),
                )
            });
    }

    Ok(TargetSet {
        targets,
        ci_testing_group,
    })
}

/// One configuration per web server command, minus the reserved `default`.
pub fn web_server_configurations(
    commands: Option<&IndexMap<String, String>>,
) -> IndexMap<String, TargetConfiguration> {
    commands
        .into_iter()
        .flatten()
        .filter(|(name, _)| name.as_str() != RESERVED_WEB_SERVER_COMMAND)
        .map(|(name, command)| {
            (
                name.clone(),
                TargetConfiguration {
                    command: format!("{} --env webServerCommand=\"{}\"", RUN_COMMAND, command),
                },
            )
        })
        .collect()
}

/// Artifact folders a run of `testing_type` produces.
///
/// Top-level folders come first, then the testing type's own. Absent folders
/// are skipped and duplicates are dropped.
pub fn outputs_for(
    project_root: &str,
    config: &TestRunnerConfig,
    testing_type: TestingType,
) -> Vec<String> {
    let mode = config.testing_type(testing_type);
    let folders = [
        config.videos_folder.as_deref(),
        config.screenshots_folder.as_deref(),
        mode.and_then(|m| m.videos_folder.as_deref()),
        mode.and_then(|m| m.screenshots_folder.as_deref()),
    ];

    let mut outputs: Vec<String> = Vec::new();
    for folder in folders.into_iter().flatten() {
        let output = output_path(project_root, folder);
        if !outputs.contains(&output) {
            outputs.push(output);
        }
    }
    outputs
}

/// Resolves an artifact folder to an output path.
///
/// Folders that escape the project root are anchored at the workspace root;
/// everything else at the project root.
pub fn output_path(project_root: &str, folder: &str) -> String {
    if folder.starts_with("..") {
        let resolved = path_utils::join(project_root, folder);
        anchored("{workspaceRoot}", &resolved)
    } else {
        anchored("{projectRoot}", &path_utils::normalize(folder))
    }
}

fn anchored(token: &str, path: &str) -> String {
    if path == "." {
        token.to_string()
    } else {
        format!("{}/{}", token, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_boundary() {
        assert_eq!(
            output_path("apps/web", "../outside"),
            "{workspaceRoot}/apps/outside"
        );
        assert_eq!(output_path("apps/web", "inside"), "{projectRoot}/inside");
        assert_eq!(
            output_path("apps/web", "../../dist/cypress/videos"),
            "{workspaceRoot}/dist/cypress/videos"
        );
        assert_eq!(output_path("apps/web", "./"), "{projectRoot}");
    }

    #[test]
    fn test_web_server_configurations_drop_default() {
        let mut commands = IndexMap::new();
        commands.insert("default".to_string(), "nx run web:serve".to_string());
        commands.insert("production".to_string(), "nx run web:serve:production".to_string());

        let configurations = web_server_configurations(Some(&commands));
        assert_eq!(configurations.len(), 1);
        assert_eq!(
            configurations["production"].command,
            "cypress run --env webServerCommand=\"nx run web:serve:production\""
        );
        assert!(web_server_configurations(None).is_empty());
    }
}
