//! Target synthesis for end-to-end test runner configs.
//!
//! Given a config file in a monorepo, [`TargetSynthesizer`] decides whether
//! it belongs to a project, and produces cacheable run, component-test and
//! per-spec CI targets for it, memoized across runs.

pub mod cache;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fanout;
pub mod file_index;
pub mod graph;
pub mod hash;
pub mod loader;
pub mod named_inputs;
pub mod options;
pub mod package_manager;
pub mod path_utils;
pub mod plugin;
pub mod scanner;
pub mod synth;
pub mod target;

pub use cache::{CacheEntry, CacheStats, TargetsAccumulator, TargetsCache};
pub use config::{TestRunnerConfig, TestingTypeConfig, WorkspaceConfig};
pub use discovery::{discover, ProjectDescriptor};
pub use error::{Error, Result};
pub use file_index::{FileIndex, WorkspaceFileIndex};
pub use graph::TargetGraph;
pub use hash::CacheKey;
pub use loader::ConfigLoader;
pub use options::{NormalizedOptions, PluginOptions};
pub use package_manager::PackageManager;
pub use plugin::{is_plugin_registered, TargetSynthesizer};
pub use scanner::Scanner;
pub use synth::{build_targets, SynthesisContext};
pub use target::{InputSpec, ProjectNode, TargetRef, TargetSet, TargetSpec, Targets};
