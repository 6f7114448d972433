//! Directory traversal (spec 5 Collect stage). A trait seam plus a default
//! implementation over the `ignore` crate so `.gitignore` rules and the
//! engine's own ignore globs compose for free.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::core::error::Result;

pub trait FileWalker: Send + Sync {
    /// Returns project-relative, `/`-separated source file paths under
    /// `root`, sorted so traversal order is deterministic regardless of
    /// the underlying filesystem's directory entry order.
    fn walk(&self, root: &Path, ignore_globs: &[String]) -> Result<Vec<String>>;
}

pub struct DefaultWalker;

impl DefaultWalker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DefaultWalker {
    fn default() -> Self {
        Self::new()
    }
}

impl FileWalker for DefaultWalker {
    fn walk(&self, root: &Path, ignore_globs: &[String]) -> Result<Vec<String>> {
        let mut builder = WalkBuilder::new(root);
        builder.standard_filters(true).hidden(false);
        let mut overrides = ignore::overrides::OverrideBuilder::new(root);
        for pattern in ignore_globs {
            let _ = overrides.add(&format!("!{pattern}"));
        }
        if let Ok(built) = overrides.build() {
            builder.overrides(built);
        }

        let mut paths: Vec<String> = Vec::new();
        for entry in builder.build() {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            paths.push(normalize_path(relative));
        }
        paths.sort();
        Ok(paths)
    }
}

fn normalize_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

pub fn resolve_root(path: impl AsRef<Path>) -> PathBuf {
    path.as_ref().to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walk_returns_sorted_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.rs"), "").unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        let walker = DefaultWalker::new();
        let files = walker.walk(dir.path(), &[]).unwrap();
        assert_eq!(files, vec!["a.rs", "b.rs"]);
    }

    #[test]
    fn walk_respects_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "ignored.rs\n").unwrap();
        fs::write(dir.path().join("ignored.rs"), "").unwrap();
        fs::write(dir.path().join("kept.rs"), "").unwrap();
        let walker = DefaultWalker::new();
        let files = walker.walk(dir.path(), &[]).unwrap();
        assert_eq!(files, vec!["kept.rs"]);
    }
}
