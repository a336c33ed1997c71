//! Workspace scanner for test runner config files.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Config file names the plugin reacts to.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["cypress.config.json", "cypress.config.toml"];

const MAX_SCAN_DEPTH: usize = 6;
const SKIPPED_DIRS: [&str; 3] = ["node_modules", ".git", ".nx"];

/// Finds candidate config files below a workspace root.
pub struct Scanner {
    workspace_root: PathBuf,
    max_depth: usize,
}

impl Scanner {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
            max_depth: MAX_SCAN_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns workspace-relative config paths, sorted.
    ///
    /// Unreadable directories are skipped.
    pub fn scan(&self) -> Vec<PathBuf> {
        let mut configs = Vec::new();

        let walker = WalkDir::new(&self.workspace_root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_skipped(e))
            .filter_map(|e| e.ok());

        for entry in walker {
            if !entry.file_type().is_file() {
                continue;
            }

            let is_config = entry
                .file_name()
                .to_str()
                .is_some_and(|name| CONFIG_FILE_NAMES.contains(&name));
            if !is_config {
                continue;
            }

            if let Ok(relative) = entry.path().strip_prefix(&self.workspace_root) {
                configs.push(relative.to_path_buf());
            }
        }

        configs.sort();
        configs
    }
}

fn is_skipped(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}
