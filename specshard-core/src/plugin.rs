//! Target synthesizer: discovery, cache lookup and synthesis per config file.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::cache::{TargetsAccumulator, TargetsCache};
use crate::config::{TestRunnerConfig, WorkspaceConfig};
use crate::discovery::{discover, ProjectDescriptor};
use crate::error::{Error, Result};
use crate::fanout::spec_patterns;
use crate::file_index::{FileIndex, WorkspaceFileIndex};
use crate::hash::CacheKey;
use crate::loader::ConfigLoader;
use crate::named_inputs::resolve_named_inputs;
use crate::options::{NormalizedOptions, PluginOptions};
use crate::package_manager::PackageManager;
use crate::path_utils;
use crate::synth::{build_targets, SynthesisContext};
use crate::target::{ProjectNode, TargetSet};

/// Name under which the plugin is registered in the workspace manifest.
pub const PLUGIN_NAME: &str = "@specshard/cypress";

/// Cache directory relative to the workspace root.
pub const DEFAULT_CACHE_DIR: &str = ".nx/workspace-data";

type LoaderGetter = Box<dyn Fn(&Path) -> Result<Box<dyn ConfigLoader>> + Send + Sync>;

/// Turns test runner config files into project nodes with targets.
///
/// Results are memoized by [`CacheKey`]: a hit skips synthesis. Every entry
/// produced or reused is recorded in a [`TargetsAccumulator`] owned by the
/// caller, which flushes it once at the end of the run with
/// [`TargetSynthesizer::flush`].
pub struct TargetSynthesizer {
    workspace_root: PathBuf,
    options: NormalizedOptions,
    workspace: WorkspaceConfig,
    package_manager: PackageManager,
    cache: TargetsCache,
    file_index: Box<dyn FileIndex>,
    loader_getter: LoaderGetter,
}

impl TargetSynthesizer {
    /// Creates a synthesizer from explicit collaborators.
    ///
    /// The `loader_getter` picks a [`ConfigLoader`] for a config path.
    pub fn new<F>(
        workspace_root: impl Into<PathBuf>,
        options: &PluginOptions,
        workspace: WorkspaceConfig,
        cache: TargetsCache,
        file_index: Box<dyn FileIndex>,
        loader_getter: F,
    ) -> Self
    where
        F: Fn(&Path) -> Result<Box<dyn ConfigLoader>> + Send + Sync + 'static,
    {
        let workspace_root = workspace_root.into();
        let package_manager = PackageManager::detect(&workspace_root);

        Self {
            workspace_root,
            options: options.normalize(),
            workspace,
            package_manager,
            cache,
            file_index,
            loader_getter: Box::new(loader_getter),
        }
    }

    /// Creates a synthesizer with the default collaborators for a workspace.
    ///
    /// Options given here win over the ones registered in the workspace
    /// manifest. The cache defaults to [`DEFAULT_CACHE_DIR`].
    pub fn for_workspace<F>(
        workspace_root: impl Into<PathBuf>,
        options: PluginOptions,
        cache_dir: Option<PathBuf>,
        loader_getter: F,
    ) -> Result<Self>
    where
        F: Fn(&Path) -> Result<Box<dyn ConfigLoader>> + Send + Sync + 'static,
    {
        let workspace_root = workspace_root.into();
        let workspace = WorkspaceConfig::load(&workspace_root)?;
        let options = options.or(workspace.plugin_options(PLUGIN_NAME).unwrap_or_default());
        let cache_dir = cache_dir.unwrap_or_else(|| workspace_root.join(DEFAULT_CACHE_DIR));
        let file_index = Box::new(WorkspaceFileIndex::new(&workspace_root));

        Ok(Self::new(
            workspace_root,
            &options,
            workspace,
            TargetsCache::load(cache_dir),
            file_index,
            loader_getter,
        ))
    }

    /// Replaces the cache, e.g. with an empty one to force synthesis.
    pub fn with_cache(mut self, cache: TargetsCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_package_manager(mut self, package_manager: PackageManager) -> Self {
        self.package_manager = package_manager;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    pub fn workspace(&self) -> &WorkspaceConfig {
        &self.workspace
    }

    pub fn cache(&self) -> &TargetsCache {
        &self.cache
    }

    /// Loads the test runner config of a discovered project.
    pub async fn load_config(&self, project: &ProjectDescriptor) -> Result<TestRunnerConfig> {
        let config_path = self.workspace_root.join(&project.config_file_path);
        let loader = (self.loader_getter)(&config_path)?;
        loader.load(&config_path).await
    }

    /// Computes the cache key for a discovered project and its config.
    ///
    /// Besides the project's own files, the key covers the named inputs the
    /// project sees and the spec files its e2e patterns match, wherever they
    /// live in the workspace.
    pub fn cache_key(
        &self,
        project: &ProjectDescriptor,
        config: &TestRunnerConfig,
    ) -> Result<CacheKey> {
        let root = project.root_str();
        let project_files = path_utils::join(&root, "**/*");
        let project_files_hash = self.file_index.hash_files(&[project_files])?;

        let named_inputs = resolve_named_inputs(&self.workspace, &self.workspace_root, &root);
        let named_inputs = serde_json::to_vec(&named_inputs).map_err(|error| Error::Json {
            error,
            context: "named inputs".to_string(),
        })?;

        let spec_files = match &config.e2e {
            Some(e2e) => {
                let (include, exclude) = spec_patterns(&root, e2e);
                self.file_index.glob(&include, &exclude)?
            }
            None => Vec::new(),
        };

        let lockfile_name = self.package_manager.lockfile_name();
        let lockfile = match fs::read(self.workspace_root.join(lockfile_name)) {
            Ok(contents) => Some(contents),
            Err(err) if err.kind() == ErrorKind::NotFound => None,
            Err(err) => return Err(err.into()),
        };
        trace!(
            project = %root,
            package_manager = self.package_manager.as_str(),
            lockfile_found = lockfile.is_some(),
            "hashing project inputs"
        );

        CacheKey::builder()
            .project_root(root)
            .options(self.options.clone())
            .project_files_hash(project_files_hash)
            .named_inputs(&named_inputs)
            .spec_files(spec_files)
            .lockfile(lockfile_name, lockfile.as_deref())
            .build()
    }

    /// Produces the project node for one config file.
    ///
    /// Returns `Ok(None)` when the config's directory is not a project.
    /// The config is always loaded since the key depends on it; a cache hit
    /// skips synthesis.
    ///
    /// # Errors
    ///
    /// Config load errors are propagated unmodified, as are I/O errors while
    /// hashing project inputs.
    pub async fn create_nodes(
        &mut self,
        config_file_path: &Path,
        accumulator: &mut TargetsAccumulator,
    ) -> Result<Option<ProjectNode>> {
        let Some(project) = discover(&self.workspace_root, config_file_path) else {
            return Ok(None);
        };

        let config = self.load_config(&project).await?;
        let hash = self.cache_key(&project, &config)?.hash();
        let root = project.root_str();

        let cached = match accumulator.get(&hash) {
            Some(entry) => Some(entry.clone()),
            None => self.cache.get(&hash).cloned(),
        };

        let entry = match cached {
            Some(entry) => {
                debug!(project = %root, hash = %hash, "targets cache hit");
                entry
            }
            None => {
                debug!(project = %root, hash = %hash, "targets cache miss, synthesizing");
                self.build(&project, &config)?
            }
        };

        accumulator.insert(hash, entry.clone());
        Ok(Some(ProjectNode::from_target_set(root, entry)))
    }

    /// Loads the project's config and synthesizes its targets, bypassing the
    /// cache.
    pub async fn synthesize(&self, project: &ProjectDescriptor) -> Result<TargetSet> {
        let config = self.load_config(project).await?;
        self.build(project, &config)
    }

    fn build(&self, project: &ProjectDescriptor, config: &TestRunnerConfig) -> Result<TargetSet> {
        let root = project.root_str();
        let named_inputs = resolve_named_inputs(&self.workspace, &self.workspace_root, &root);
        let ctx = SynthesisContext {
            project_root: &root,
            options: &self.options,
            named_inputs: &named_inputs,
            file_index: self.file_index.as_ref(),
        };

        build_targets(config, &ctx)
    }

    /// Writes the accumulated entries to the cache file.
    pub fn flush(&self, accumulator: &TargetsAccumulator) -> Result<()> {
        self.cache.flush(accumulator)
    }
}

/// Whether `plugin_name` is registered in the workspace manifest.
pub fn is_plugin_registered(workspace: &WorkspaceConfig, plugin_name: &str) -> bool {
    workspace.has_plugin(plugin_name)
}
