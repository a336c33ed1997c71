//! Lexical path helpers for workspace-relative paths.
//!
//! Target definitions always use `/` separators regardless of platform, so
//! these helpers work on strings split at `/` rather than on `Path`.

use std::path::{Component, Path};

/// Renders a relative path with `/` separators.
///
/// An empty path renders as `"."`.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Collapses `.` and `..` segments and duplicate separators.
///
/// Leading `..` segments that cannot be collapsed are kept.
pub fn normalize(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Joins `path` onto `base` and normalizes the result.
pub fn join(base: &str, path: &str) -> String {
    normalize(&format!("{}/{}", base, path))
}

/// Expresses `path` relative to `base`. Both are workspace-relative.
pub fn relative_to(path: &str, base: &str) -> String {
    let path = normalize(path);
    let base = normalize(base);

    if base == "." {
        return path;
    }

    let path_segments: Vec<&str> = path.split('/').filter(|s| *s != ".").collect();
    let base_segments: Vec<&str> = base.split('/').collect();

    let common = path_segments
        .iter()
        .zip(base_segments.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(base_segments.len() - common));
    parts.extend(&path_segments[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("apps/web/./cypress//videos"), "apps/web/cypress/videos");
        assert_eq!(normalize("apps/web/../../dist"), "dist");
        assert_eq!(normalize("../outside"), "../outside");
        assert_eq!(normalize("./"), ".");
    }

    #[test]
    fn test_join() {
        assert_eq!(join("apps/web", "../../dist/videos"), "dist/videos");
        assert_eq!(join(".", "cypress/e2e/**/*.cy.ts"), "cypress/e2e/**/*.cy.ts");
    }

    #[test]
    fn test_relative_to() {
        assert_eq!(relative_to("apps/web/src/a.cy.ts", "apps/web"), "src/a.cy.ts");
        assert_eq!(relative_to("libs/shared/b.cy.ts", "apps/web"), "../../libs/shared/b.cy.ts");
        assert_eq!(relative_to("a.cy.ts", "."), "a.cy.ts");
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("apps").join("web").as_path()), "apps/web");
        assert_eq!(to_slash(Path::new("")), ".");
    }
}
