//! Package manager detection and lockfile names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supported JavaScript package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
    Bun,
}

impl PackageManager {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
            PackageManager::Bun => "bun",
        }
    }

    /// File name of this package manager's lockfile.
    #[inline]
    pub fn lockfile_name(&self) -> &'static str {
        match self {
            PackageManager::Npm => "package-lock.json",
            PackageManager::Yarn => "yarn.lock",
            PackageManager::Pnpm => "pnpm-lock.yaml",
            PackageManager::Bun => "bun.lockb",
        }
    }

    /// Parses a package manager name, accepting a `name@version` suffix.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        let name = s.split('@').next().unwrap_or(s);
        match name.trim().to_lowercase().as_str() {
            "npm" => Some(PackageManager::Npm),
            "yarn" => Some(PackageManager::Yarn),
            "pnpm" => Some(PackageManager::Pnpm),
            "bun" => Some(PackageManager::Bun),
            _ => None,
        }
    }

    /// Detects the workspace's package manager.
    ///
    /// Lockfiles are checked first (bun, yarn, pnpm), then the
    /// `packageManager` field of the root `package.json`. Falls back to npm.
    pub fn detect(workspace_root: &Path) -> Self {
        for manager in [PackageManager::Bun, PackageManager::Yarn, PackageManager::Pnpm] {
            if workspace_root.join(manager.lockfile_name()).exists() {
                return manager;
            }
        }

        fs::read_to_string(workspace_root.join("package.json"))
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .and_then(|json| {
                json.get("packageManager")
                    .and_then(Value::as_str)
                    .and_then(PackageManager::from_str)
            })
            .unwrap_or(PackageManager::Npm)
    }
}
