//! Project discovery for a candidate config file.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::path_utils::to_slash;

/// Files whose presence next to a config marks a project root.
pub const PROJECT_MARKERS: [&str; 2] = ["package.json", "project.json"];

/// A buildable, testable unit found next to a config file.
///
/// Both paths are relative to the workspace root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub root: PathBuf,
    pub config_file_path: PathBuf,
}

impl ProjectDescriptor {
    /// The project root with `/` separators, `"."` for the workspace root.
    pub fn root_str(&self) -> String {
        to_slash(&self.root)
    }
}

/// Decides whether `config_file_path` belongs to a project.
///
/// Only the config's own directory is listed. Returns `None` when neither
/// `package.json` nor `project.json` sits next to it, or when the directory
/// cannot be read.
pub fn discover(workspace_root: &Path, config_file_path: &Path) -> Option<ProjectDescriptor> {
    let root = config_file_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let dir = workspace_root.join(&root);

    let siblings: FxHashSet<String> = match fs::read_dir(&dir) {
        Ok(entries) => entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect(),
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "cannot list project directory");
            return None;
        }
    };

    if !PROJECT_MARKERS.iter().any(|marker| siblings.contains(*marker)) {
        debug!(dir = %dir.display(), "no project marker next to config, skipping");
        return None;
    }

    Some(ProjectDescriptor {
        root,
        config_file_path: config_file_path.to_path_buf(),
    })
}
