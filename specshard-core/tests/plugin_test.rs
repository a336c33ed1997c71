use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use specshard_core::cache::{TargetsAccumulator, TargetsCache, CACHE_FILE_NAME};
use specshard_core::config::{TestRunnerConfig, WorkspaceConfig};
use specshard_core::discovery::{discover, ProjectDescriptor};
use specshard_core::error::{Error, Result};
use specshard_core::file_index::WorkspaceFileIndex;
use specshard_core::loader::ConfigLoader;
use specshard_core::options::PluginOptions;
use specshard_core::package_manager::PackageManager;
use specshard_core::plugin::{is_plugin_registered, TargetSynthesizer, PLUGIN_NAME};
use specshard_core::target::{InputSpec, ProjectNode};
use tempfile::TempDir;

/// Reads JSON configs and counts how often it was asked to.
struct CountingLoader {
    loads: Arc<AtomicUsize>,
}

#[async_trait]
impl ConfigLoader for CountingLoader {
    fn format(&self) -> &'static str {
        "json"
    }

    fn supports(&self, _path: &Path) -> bool {
        true
    }

    async fn load(&self, path: &Path) -> Result<TestRunnerConfig> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| Error::ConfigLoad {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

const CONFIG: &str = r#"{
  "e2e": {
    "specPattern": "src/e2e/**/*.cy.ts",
    "nxPluginOptions": { "ciWebServerCommand": "nx run web:serve-static" }
  }
}"#;

fn create_workspace() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "package-lock.json", "{\"lockfileVersion\": 3}");
    write(root, "apps/web/project.json", "{}");
    write(root, "apps/web/cypress.config.json", CONFIG);
    write(root, "apps/web/src/e2e/a.cy.ts", "it('a')");
    write(root, "apps/web/src/e2e/b.cy.ts", "it('b')");
    temp_dir
}

fn synthesizer(
    root: &Path,
    options: PluginOptions,
    loads: &Arc<AtomicUsize>,
) -> TargetSynthesizer {
    let loads = Arc::clone(loads);
    TargetSynthesizer::new(
        root,
        &options,
        WorkspaceConfig::load(root).unwrap(),
        TargetsCache::load(root.join(".cache")),
        Box::new(WorkspaceFileIndex::new(root)),
        move |_path: &Path| -> Result<Box<dyn ConfigLoader>> {
            Ok(Box::new(CountingLoader {
                loads: Arc::clone(&loads),
            }))
        },
    )
}

#[tokio::test]
async fn test_config_without_project_marker_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    write(temp_dir.path(), "tools/cypress.config.json", CONFIG);
    let loads = Arc::new(AtomicUsize::new(0));
    let mut synthesizer = synthesizer(temp_dir.path(), PluginOptions::default(), &loads);
    let mut accumulator = TargetsAccumulator::new();

    let node = synthesizer
        .create_nodes(Path::new("tools/cypress.config.json"), &mut accumulator)
        .await
        .unwrap();

    assert!(node.is_none());
    assert!(accumulator.is_empty());
    assert_eq!(loads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_create_nodes_synthesizes_project() {
    let temp_dir = create_workspace();
    let loads = Arc::new(AtomicUsize::new(0));
    let mut synthesizer = synthesizer(temp_dir.path(), PluginOptions::default(), &loads);
    let mut accumulator = TargetsAccumulator::new();

    let node = synthesizer
        .create_nodes(Path::new("apps/web/cypress.config.json"), &mut accumulator)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(node.root, "apps/web");
    assert_eq!(node.project_type, "application");
    let names: Vec<&str> = node.targets.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["e2e", "e2e-ci--src/e2e/a.cy.ts", "e2e-ci--src/e2e/b.cy.ts", "e2e-ci"]
    );
    assert_eq!(
        node.metadata.target_groups["apps/web:cypress"],
        vec![
            "e2e-ci--src/e2e/a.cy.ts".to_string(),
            "e2e-ci--src/e2e/b.cy.ts".to_string(),
            "e2e-ci".to_string(),
        ]
    );
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(accumulator.len(), 1);
}

async fn run_once(
    root: &Path,
    options: PluginOptions,
    loads: &Arc<AtomicUsize>,
    config_path: &str,
) -> (ProjectNode, TargetSynthesizer) {
    let mut synthesizer = synthesizer(root, options, loads);
    let mut accumulator = TargetsAccumulator::new();
    let node = synthesizer
        .create_nodes(Path::new(config_path), &mut accumulator)
        .await
        .unwrap()
        .unwrap();
    synthesizer.flush(&accumulator).unwrap();
    (node, synthesizer)
}

async fn key(synthesizer: &TargetSynthesizer, project: &ProjectDescriptor) -> String {
    let config = synthesizer.load_config(project).await.unwrap();
    synthesizer.cache_key(project, &config).unwrap().hash()
}

fn target_names(node: &ProjectNode) -> Vec<&str> {
    node.targets.keys().map(String::as_str).collect()
}

#[tokio::test]
async fn test_cache_round_trip_skips_synthesis() {
    let temp_dir = create_workspace();
    let root = temp_dir.path();
    let loads = Arc::new(AtomicUsize::new(0));

    let (first, synthesizer) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;
    assert_eq!(synthesizer.cache().stats().misses, 1);

    let cache_file: Value =
        serde_json::from_str(&fs::read_to_string(root.join(".cache").join(CACHE_FILE_NAME)).unwrap())
            .unwrap();
    let entries = cache_file.as_object().unwrap();
    assert_eq!(entries.len(), 1);
    let entry = entries.values().next().unwrap();
    assert!(entry["targets"]["e2e-ci"].is_object());
    assert_eq!(entry["ciTestingGroup"].as_array().unwrap().len(), 3);

    let (second, synthesizer) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;

    assert_eq!(first, second);
    assert_eq!(synthesizer.cache().stats().hits, 1);
    assert_eq!(synthesizer.cache().stats().misses, 0);
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_same_hash_in_one_run_reuses_entry() {
    let temp_dir = create_workspace();
    let loads = Arc::new(AtomicUsize::new(0));
    let mut synthesizer = synthesizer(temp_dir.path(), PluginOptions::default(), &loads);
    let mut accumulator = TargetsAccumulator::new();
    let config_path = Path::new("apps/web/cypress.config.json");

    let first = synthesizer
        .create_nodes(config_path, &mut accumulator)
        .await
        .unwrap();
    let second = synthesizer
        .create_nodes(config_path, &mut accumulator)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(accumulator.len(), 1);
    // The second call is served from the accumulator, not the cache file.
    assert_eq!(synthesizer.cache().stats().misses, 1);
    assert_eq!(synthesizer.cache().stats().hits, 0);
}

#[tokio::test]
async fn test_option_and_lockfile_changes_invalidate() {
    let temp_dir = create_workspace();
    let root = temp_dir.path();
    let loads = Arc::new(AtomicUsize::new(0));
    let project = discover(root, Path::new("apps/web/cypress.config.json")).unwrap();

    let base = key(&synthesizer(root, PluginOptions::default(), &loads), &project).await;

    let renamed = key(
        &synthesizer(
            root,
            PluginOptions {
                ci_target_name: Some("ci".to_string()),
                ..Default::default()
            },
            &loads,
        ),
        &project,
    )
    .await;
    assert_ne!(base, renamed);

    write(root, "package-lock.json", "{\"lockfileVersion\": 3, \"packages\": {}}");
    let bumped = key(&synthesizer(root, PluginOptions::default(), &loads), &project).await;
    assert_ne!(base, bumped);

    write(root, "apps/web/cypress.config.json", "{}");
    let edited = key(&synthesizer(root, PluginOptions::default(), &loads), &project).await;
    assert_ne!(bumped, edited);
}

#[tokio::test]
async fn test_package_manager_selects_lockfile() {
    let temp_dir = create_workspace();
    let root = temp_dir.path();
    let loads = Arc::new(AtomicUsize::new(0));
    let project = discover(root, Path::new("apps/web/cypress.config.json")).unwrap();
    let yarn = || {
        synthesizer(root, PluginOptions::default(), &loads)
            .with_package_manager(PackageManager::Yarn)
    };

    let before = key(&yarn(), &project).await;
    // npm's lockfile is not consulted once yarn is selected.
    write(root, "package-lock.json", "{\"lockfileVersion\": 2}");
    assert_eq!(before, key(&yarn(), &project).await);

    write(root, "yarn.lock", "cypress@13.6.0");
    assert_ne!(before, key(&yarn(), &project).await);
}

#[tokio::test]
async fn test_workspace_named_inputs_change_invalidates() {
    let temp_dir = create_workspace();
    let root = temp_dir.path();
    let loads = Arc::new(AtomicUsize::new(0));
    write(root, "nx.json", r#"{"namedInputs": {"default": ["{projectRoot}/**/*"]}}"#);

    let (first, _) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;
    assert_eq!(first.targets["e2e"].inputs[1], InputSpec::named("^default"));

    write(
        root,
        "nx.json",
        r#"{"namedInputs": {"default": ["{projectRoot}/**/*"], "production": ["default"]}}"#,
    );
    let (second, synthesizer) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;

    assert_eq!(synthesizer.cache().stats().hits, 0);
    assert_eq!(second.targets["e2e"].inputs[1], InputSpec::named("^production"));
}

#[tokio::test]
async fn test_spec_files_outside_project_invalidate() {
    let temp_dir = create_workspace();
    let root = temp_dir.path();
    let loads = Arc::new(AtomicUsize::new(0));
    write(
        root,
        "apps/web/cypress.config.json",
        r#"{
  "e2e": {
    "specPattern": "../../libs/shared/**/*.cy.ts",
    "nxPluginOptions": { "ciWebServerCommand": "nx run web:serve-static" }
  }
}"#,
    );
    write(root, "libs/shared/a.cy.ts", "it('a')");

    let (first, _) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;
    assert_eq!(
        target_names(&first),
        vec!["e2e", "e2e-ci--../../libs/shared/a.cy.ts", "e2e-ci"]
    );

    write(root, "libs/shared/b.cy.ts", "it('b')");
    let (second, synthesizer) =
        run_once(root, PluginOptions::default(), &loads, "apps/web/cypress.config.json").await;

    assert_eq!(synthesizer.cache().stats().hits, 0);
    assert_eq!(
        target_names(&second),
        vec![
            "e2e",
            "e2e-ci--../../libs/shared/a.cy.ts",
            "e2e-ci--../../libs/shared/b.cy.ts",
            "e2e-ci",
        ]
    );
}

#[tokio::test]
async fn test_root_project_slashless_pattern_matches_top_level_only() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write(root, "package.json", r#"{"name": "site"}"#);
    write(
        root,
        "cypress.config.json",
        r#"{
  "e2e": {
    "specPattern": "*.cy.ts",
    "nxPluginOptions": { "ciWebServerCommand": "npm run serve" }
  }
}"#,
    );
    write(root, "home.cy.ts", "it('home')");
    write(root, "nested/deep/other.cy.ts", "it('other')");
    let loads = Arc::new(AtomicUsize::new(0));

    let (node, _) = run_once(root, PluginOptions::default(), &loads, "cypress.config.json").await;

    assert_eq!(node.root, ".");
    assert_eq!(target_names(&node), vec!["e2e", "e2e-ci--home.cy.ts", "e2e-ci"]);
}

#[tokio::test]
async fn test_config_load_error_is_propagated() {
    let temp_dir = create_workspace();
    write(temp_dir.path(), "apps/web/cypress.config.json", "{ not json");
    let loads = Arc::new(AtomicUsize::new(0));
    let mut synthesizer = synthesizer(temp_dir.path(), PluginOptions::default(), &loads);
    let mut accumulator = TargetsAccumulator::new();

    let err = synthesizer
        .create_nodes(Path::new("apps/web/cypress.config.json"), &mut accumulator)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ConfigLoad { .. }));
    assert!(accumulator.is_empty());
}

#[tokio::test]
async fn test_production_named_input_from_workspace() {
    let temp_dir = create_workspace();
    write(
        temp_dir.path(),
        "nx.json",
        r#"{
  "namedInputs": { "default": ["{projectRoot}/**/*"], "production": ["default"] },
  "plugins": [{ "plugin": "@specshard/cypress", "options": { "targetName": "cy" } }]
}"#,
    );
    let loads = Arc::new(AtomicUsize::new(0));
    let mut synthesizer = TargetSynthesizer::for_workspace(
        temp_dir.path(),
        PluginOptions::default(),
        None,
        {
            let loads = Arc::clone(&loads);
            move |_path: &Path| -> Result<Box<dyn ConfigLoader>> {
                Ok(Box::new(CountingLoader {
                    loads: Arc::clone(&loads),
                }))
            }
        },
    )
    .unwrap();
    assert!(is_plugin_registered(synthesizer.workspace(), PLUGIN_NAME));
    assert!(!is_plugin_registered(synthesizer.workspace(), "@other/plugin"));

    let mut accumulator = TargetsAccumulator::new();
    let node = synthesizer
        .create_nodes(Path::new("apps/web/cypress.config.json"), &mut accumulator)
        .await
        .unwrap()
        .unwrap();

    let target = &node.targets["cy"];
    assert_eq!(
        serde_json::to_value(&target.inputs).unwrap(),
        serde_json::json!(["default", "^production", { "externalDependencies": ["cypress"] }])
    );
}
