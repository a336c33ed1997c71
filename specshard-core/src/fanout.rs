//! CI fan-out: one cacheable target per spec file plus an umbrella target.

use tracing::debug;

use crate::config::TestingTypeConfig;
use crate::error::Result;
use crate::path_utils;
use crate::synth::{SynthesisContext, RUN_COMMAND};
use crate::target::{InputSpec, TargetRef, TargetSpec, Targets};

/// Spec pattern used when the e2e config does not set one.
pub const DEFAULT_SPEC_PATTERN: &str = "cypress/e2e/**/*.cy.{js,jsx,ts,tsx}";

/// Include and exclude patterns, joined onto the project root.
///
/// An absent exclude pattern means nothing is excluded.
pub fn spec_patterns(project_root: &str, e2e: &TestingTypeConfig) -> (Vec<String>, Vec<String>) {
    let include = match &e2e.spec_pattern {
        Some(patterns) => patterns
            .iter()
            .map(|p| path_utils::join(project_root, p))
            .collect(),
        None => vec![path_utils::join(project_root, DEFAULT_SPEC_PATTERN)],
    };

    let exclude = e2e
        .exclude_spec_pattern
        .iter()
        .flat_map(|patterns| patterns.iter())
        .map(|p| path_utils::join(project_root, p))
        .collect();

    (include, exclude)
}

#[inline]
pub fn shard_target_name(ci_target_name: &str, relative_spec: &str) -> String {
    format!("{}--{}", ci_target_name, relative_spec)
}

#[inline]
pub fn shard_command(ci_web_server_command: &str, relative_spec: &str) -> String {
    format!(
        "{} --env webServerCommand=\"{}\" --spec {}",
        RUN_COMMAND, ci_web_server_command, relative_spec
    )
}

/// Shards the e2e run into one target per matching spec file.
///
/// Shards are inserted in enumeration order, followed by an umbrella no-op
/// target named after the CI target that depends on all of them. The umbrella
/// never replaces an existing target of the same name.
///
/// Returns the CI group (shard names, then the umbrella name), or `None`
/// when no spec file matched, in which case nothing is inserted.
pub fn fan_out(
    e2e: &TestingTypeConfig,
    ci_web_server_command: &str,
    ctx: &SynthesisContext<'_>,
    inputs: &[InputSpec],
    outputs: &[String],
    targets: &mut Targets,
) -> Result<Option<Vec<String>>> {
    let (include, exclude) = spec_patterns(ctx.project_root, e2e);
    let spec_files = ctx.file_index.glob(&include, &exclude)?;

    if spec_files.is_empty() {
        debug!(project = ctx.project_root, patterns = ?include, "no spec files matched");
        return Ok(None);
    }

    let ci_target_name = &ctx.options.ci_target_name;
    let mut group = Vec::with_capacity(spec_files.len() + 1);
    let mut depends_on = Vec::with_capacity(spec_files.len());

    for file in &spec_files {
        let relative_spec = path_utils::relative_to(file, ctx.project_root);
        let name = shard_target_name(ci_target_name, &relative_spec);

        targets.insert(
            name.clone(),
            TargetSpec::runnable(
                shard_command(ci_web_server_command, &relative_spec),
                ctx.project_root,
                inputs.to_vec(),
                outputs.to_vec(),
            ),
        );
        depends_on.push(TargetRef::forwarding_to_self(name.clone()));
        group.push(name);
    }

    targets
        .entry(ci_target_name.clone())
        .or_insert_with(|| TargetSpec::noop(inputs.to_vec(), outputs.to_vec(), depends_on));
    group.push(ci_target_name.clone());

    debug!(
        project = ctx.project_root,
        shards = spec_files.len(),
        "fanned out CI target"
    );
    Ok(Some(group))
}
