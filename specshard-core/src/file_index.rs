//! Workspace file enumeration and content hashing.

use std::fs;
use std::path::{Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{Error, Result};
use crate::path_utils::to_slash;

/// Enumerates and fingerprints workspace files.
///
/// Patterns and returned paths are relative to the workspace root and use
/// `/` separators. Implementations must honour the workspace's ignore rules
/// and return paths in a stable order.
pub trait FileIndex: Send + Sync {
    /// Files matching any of `include` and none of `exclude`.
    fn glob(&self, include: &[String], exclude: &[String]) -> Result<Vec<String>>;

    /// A digest over the paths and contents of every file matching `patterns`.
    fn hash_files(&self, patterns: &[String]) -> Result<String>;
}

/// [`FileIndex`] backed by a walk of the workspace.
///
/// `.gitignore` and `.ignore` files are respected even outside a git
/// repository, and hidden entries are skipped.
pub struct WorkspaceFileIndex {
    workspace_root: PathBuf,
}

impl WorkspaceFileIndex {
    pub fn new(workspace_root: impl AsRef<Path>) -> Self {
        Self {
            workspace_root: workspace_root.as_ref().to_path_buf(),
        }
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Compiles workspace-relative globs into an override matcher.
    ///
    /// Patterns are anchored at the workspace root, otherwise a slashless
    /// pattern like `*.cy.ts` would match at any depth.
    fn build_matcher(&self, include: &[String], exclude: &[String]) -> Result<Override> {
        let mut builder = OverrideBuilder::new(&self.workspace_root);

        for pattern in include {
            builder.add(&anchored(pattern)).map_err(|e| Error::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }
        for pattern in exclude {
            builder.add(&format!("!{}", anchored(pattern))).map_err(|e| Error::Glob {
                pattern: pattern.clone(),
                message: e.to_string(),
            })?;
        }

        builder.build().map_err(|e| Error::Glob {
            pattern: include.join(", "),
            message: e.to_string(),
        })
    }
}

fn anchored(pattern: &str) -> String {
    if pattern.starts_with('/') {
        pattern.to_string()
    } else {
        format!("/{}", pattern)
    }
}

impl FileIndex for WorkspaceFileIndex {
    fn glob(&self, include: &[String], exclude: &[String]) -> Result<Vec<String>> {
        if include.is_empty() {
            return Ok(Vec::new());
        }

        let matcher = self.build_matcher(include, exclude)?;
        let walker = WalkBuilder::new(&self.workspace_root)
            .require_git(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let relative = match entry.path().strip_prefix(&self.workspace_root) {
                Ok(relative) => relative,
                Err(_) => continue,
            };

            if matcher.matched(relative, false).is_whitelist() {
                files.push(to_slash(relative));
            }
        }

        trace!(count = files.len(), patterns = ?include, "glob enumerated files");
        Ok(files)
    }

    fn hash_files(&self, patterns: &[String]) -> Result<String> {
        let files = self.glob(patterns, &[])?;

        let fingerprints: Vec<(String, u64)> = files
            .into_par_iter()
            .map(|relative| -> Result<(String, u64)> {
                let content = fs::read(self.workspace_root.join(&relative))?;
                Ok((relative, xxh3_64(&content)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut hasher = Sha256::new();
        for (relative, fingerprint) in &fingerprints {
            hasher.update(relative.as_bytes());
            hasher.update([0u8]);
            hasher.update(fingerprint.to_le_bytes());
        }
        Ok(format!("{:x}", hasher.finalize()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    #[test]
    fn test_glob_include_and_exclude() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "apps/web/cypress/e2e/a.cy.ts");
        touch(temp_dir.path(), "apps/web/cypress/e2e/b.cy.ts");
        touch(temp_dir.path(), "apps/web/cypress/e2e/skip.cy.ts");
        touch(temp_dir.path(), "apps/web/src/main.ts");

        let index = WorkspaceFileIndex::new(temp_dir.path());
        let files = index
            .glob(
                &["apps/web/cypress/e2e/**/*.cy.ts".to_string()],
                &["apps/web/cypress/e2e/skip.cy.ts".to_string()],
            )
            .unwrap();

        assert_eq!(
            files,
            vec![
                "apps/web/cypress/e2e/a.cy.ts".to_string(),
                "apps/web/cypress/e2e/b.cy.ts".to_string(),
            ]
        );
    }

    #[test]
    fn test_glob_respects_gitignore() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".gitignore"), "generated/\n").unwrap();
        touch(temp_dir.path(), "e2e/a.cy.ts");
        touch(temp_dir.path(), "generated/b.cy.ts");

        let index = WorkspaceFileIndex::new(temp_dir.path());
        let files = index.glob(&["**/*.cy.ts".to_string()], &[]).unwrap();

        assert_eq!(files, vec!["e2e/a.cy.ts".to_string()]);
    }

    #[test]
    fn test_glob_slashless_pattern_stays_at_root() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.cy.ts");
        touch(temp_dir.path(), "nested/deep/b.cy.ts");
        touch(temp_dir.path(), "nested/skip.cy.ts");

        let index = WorkspaceFileIndex::new(temp_dir.path());
        assert_eq!(
            index.glob(&["*.cy.ts".to_string()], &[]).unwrap(),
            vec!["a.cy.ts".to_string()]
        );

        let files = index
            .glob(&["**/*.cy.ts".to_string()], &["skip.cy.ts".to_string()])
            .unwrap();
        assert_eq!(
            files,
            vec![
                "a.cy.ts".to_string(),
                "nested/deep/b.cy.ts".to_string(),
                "nested/skip.cy.ts".to_string(),
            ]
        );
    }

    #[test]
    fn test_hash_files_tracks_content() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "apps/web/cypress.config.json");
        let index = WorkspaceFileIndex::new(temp_dir.path());
        let patterns = vec!["apps/web/**/*".to_string()];

        let before = index.hash_files(&patterns).unwrap();
        assert_eq!(before, index.hash_files(&patterns).unwrap());

        fs::write(temp_dir.path().join("apps/web/cypress.config.json"), "{}").unwrap();
        assert_ne!(before, index.hash_files(&patterns).unwrap());
    }
}
