//! Target data models.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Targets keyed by name, in the order they were synthesized.
pub type Targets = IndexMap<String, TargetSpec>;

/// Executor for targets that only aggregate their dependencies.
pub const NOOP_EXECUTOR: &str = "nx:noop";

/// A cache-affecting input of a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSpec {
    /// A named input group such as `default`, or `^production` for the
    /// group of every dependency.
    Named(String),
    /// External packages whose installed version invalidates the cache.
    External {
        #[serde(rename = "externalDependencies")]
        external_dependencies: Vec<String>,
    },
}

impl InputSpec {
    pub fn named(name: impl Into<String>) -> Self {
        InputSpec::Named(name.into())
    }

    pub fn external<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputSpec::External {
            external_dependencies: packages.into_iter().map(Into::into).collect(),
        }
    }
}

/// How invocation parameters flow to a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Params {
    Forward,
}

/// A dependency on another target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRef {
    pub target: String,
    pub projects: String,
    pub params: Params,
}

impl TargetRef {
    /// A dependency on `target` in the same project that forwards parameters.
    pub fn forwarding_to_self(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            projects: "self".to_string(),
            params: Params::Forward,
        }
    }

    #[inline]
    pub fn is_self(&self) -> bool {
        self.projects == "self"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetOptions {
    /// Working directory, relative to the workspace root.
    pub cwd: String,
}

/// A named variant of a target that swaps in a different command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfiguration {
    pub command: String,
}

/// One invocable, cacheable unit of work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<TargetOptions>,
    #[serde(default)]
    pub cache: bool,
    #[serde(default)]
    pub inputs: Vec<InputSpec>,
    #[serde(default)]
    pub outputs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<TargetRef>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub configurations: IndexMap<String, TargetConfiguration>,
}

impl TargetSpec {
    /// A cacheable target that runs `command` from `cwd`.
    pub fn runnable(
        command: impl Into<String>,
        cwd: impl Into<String>,
        inputs: Vec<InputSpec>,
        outputs: Vec<String>,
    ) -> Self {
        Self {
            command: Some(command.into()),
            options: Some(TargetOptions { cwd: cwd.into() }),
            cache: true,
            inputs,
            outputs,
            ..Default::default()
        }
    }

    /// A cacheable target that does nothing but wait for `depends_on`.
    pub fn noop(inputs: Vec<InputSpec>, outputs: Vec<String>, depends_on: Vec<TargetRef>) -> Self {
        Self {
            executor: Some(NOOP_EXECUTOR.to_string()),
            cache: true,
            inputs,
            outputs,
            depends_on,
            ..Default::default()
        }
    }

    #[inline]
    pub fn working_dir(&self) -> Option<&str> {
        self.options.as_ref().map(|o| o.cwd.as_str())
    }
}

/// Targets synthesized for one config, with the CI sharding group.
///
/// `ci_testing_group` is `None` when no spec file was sharded; it is never
/// an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSet {
    pub targets: Targets,
    pub ci_testing_group: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub target_groups: IndexMap<String, Vec<String>>,
}

/// A project as handed back to the host's project graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub root: String,
    pub project_type: String,
    pub targets: Targets,
    #[serde(default)]
    pub metadata: ProjectMetadata,
}

impl ProjectNode {
    /// Builds an application project from synthesized targets.
    ///
    /// A CI group, when present, is published as the `{root}:cypress`
    /// target group.
    pub fn from_target_set(root: impl Into<String>, set: TargetSet) -> Self {
        let root = root.into();
        let mut metadata = ProjectMetadata::default();
        if let Some(group) = set.ci_testing_group {
            metadata
                .target_groups
                .insert(format!("{}:cypress", root), group);
        }

        Self {
            root,
            project_type: "application".to_string(),
            targets: set.targets,
            metadata,
        }
    }
}
