//! Deterministic cache keys for synthesized targets.

use sha2::{Digest, Sha256};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::{Error, Result};
use crate::options::NormalizedOptions;

/// Everything that can change the targets synthesized for a project:
/// - project root
/// - normalized plugin options
/// - digest of the project's files (config edits)
/// - named inputs visible to the project (workspace manifest edits)
/// - spec files matched by the e2e patterns, which may lie outside the
///   project root
/// - lockfile contents (installed test runner version)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey {
    pub project_root: String,
    pub options: NormalizedOptions,
    pub project_files_hash: String,
    /// Fingerprint of the serialized named inputs, `None` when not given.
    pub named_inputs: Option<u64>,
    pub spec_files: Vec<String>,
    /// Lockfile name and a fingerprint of its contents, `None` when absent.
    pub lockfiles: Vec<(String, Option<u64>)>,
}

impl CacheKey {
    pub fn builder() -> CacheKeyBuilder {
        CacheKeyBuilder::new()
    }

    /// Hex-encoded SHA-256 over every component.
    ///
    /// Components are length-prefixed so adjacent fields cannot bleed into
    /// each other.
    pub fn hash(&self) -> String {
        let mut hasher = Sha256::new();

        update_field(&mut hasher, self.project_root.as_bytes());
        update_field(&mut hasher, self.options.target_name.as_bytes());
        update_field(
            &mut hasher,
            self.options.component_testing_target_name.as_bytes(),
        );
        update_field(&mut hasher, self.options.ci_target_name.as_bytes());
        update_field(&mut hasher, self.project_files_hash.as_bytes());

        match self.named_inputs {
            Some(fingerprint) => {
                hasher.update([1u8]);
                hasher.update(fingerprint.to_le_bytes());
            }
            None => hasher.update([0u8]),
        }

        hasher.update((self.spec_files.len() as u64).to_le_bytes());
        for spec_file in &self.spec_files {
            update_field(&mut hasher, spec_file.as_bytes());
        }

        for (name, fingerprint) in &self.lockfiles {
            update_field(&mut hasher, name.as_bytes());
            match fingerprint {
                Some(fingerprint) => {
                    hasher.update([1u8]);
                    hasher.update(fingerprint.to_le_bytes());
                }
                None => hasher.update([0u8]),
            }
        }

        format!("{:x}", hasher.finalize())
    }
}

fn update_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

pub struct CacheKeyBuilder {
    project_root: Option<String>,
    options: Option<NormalizedOptions>,
    project_files_hash: Option<String>,
    named_inputs: Option<u64>,
    spec_files: Vec<String>,
    lockfiles: Vec<(String, Option<u64>)>,
}

impl CacheKeyBuilder {
    fn new() -> Self {
        Self {
            project_root: None,
            options: None,
            project_files_hash: None,
            named_inputs: None,
            spec_files: Vec::new(),
            lockfiles: Vec::new(),
        }
    }

    pub fn project_root(mut self, project_root: impl Into<String>) -> Self {
        self.project_root = Some(project_root.into());
        self
    }

    pub fn options(mut self, options: NormalizedOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn project_files_hash(mut self, hash: impl Into<String>) -> Self {
        self.project_files_hash = Some(hash.into());
        self
    }

    /// Serialized named inputs; only their fingerprint is kept.
    pub fn named_inputs(mut self, serialized: &[u8]) -> Self {
        self.named_inputs = Some(xxh3_64(serialized));
        self
    }

    pub fn spec_files(mut self, spec_files: Vec<String>) -> Self {
        self.spec_files = spec_files;
        self
    }

    /// Adds a lockfile by name with its contents, or `None` if it is missing.
    pub fn lockfile(mut self, name: impl Into<String>, contents: Option<&[u8]>) -> Self {
        self.lockfiles.push((name.into(), contents.map(xxh3_64)));
        self
    }

    /// # Errors
    ///
    /// Returns an error if the project root, options or project files hash
    /// is missing.
    pub fn build(self) -> Result<CacheKey> {
        Ok(CacheKey {
            project_root: self.project_root.ok_or(Error::CacheKey("project_root"))?,
            options: self.options.ok_or(Error::CacheKey("options"))?,
            project_files_hash: self
                .project_files_hash
                .ok_or(Error::CacheKey("project_files_hash"))?,
            named_inputs: self.named_inputs,
            spec_files: self.spec_files,
            lockfiles: self.lockfiles,
        })
    }
}
