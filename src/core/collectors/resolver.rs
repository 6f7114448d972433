//! Import resolver interface (spec 6.2): a pure function turning a raw
//! import string into a project-relative path, or `None` for phantom/
//! external imports.

use std::collections::HashSet;
use std::path::Path;

pub trait Resolver: Send + Sync {
    /// Resolves `import_str`, written inside `importer_path`, against the
    /// known project file set rooted at `root`. `None` covers both
    /// external packages (silently dropped upstream) and phantom imports
    /// (kept as an `UnresolvedEdge`); the caller distinguishes the two via
    /// [`is_external`].
    fn resolve(&self, import_str: &str, importer_path: &str, root: &Path) -> Option<String>;

    /// Whether `import_str` looks like a third-party/stdlib package rather
    /// than a project-relative reference (no leading `.` or `/`, and not a
    /// known source extension).
    fn is_external(&self, import_str: &str) -> bool {
        is_external_heuristic(import_str)
    }
}

fn is_external_heuristic(import_str: &str) -> bool {
    !(import_str.starts_with('.') || import_str.starts_with('/'))
}

/// Default resolver: treats `import_str` as a relative or root-relative
/// path against `root`'s known file set, trying a handful of source
/// extensions and `mod.rs`/`index.*`-style directory fallbacks.
pub struct PathResolver<'a> {
    known_files: &'a HashSet<String>,
}

impl<'a> PathResolver<'a> {
    pub fn new(known_files: &'a HashSet<String>) -> Self {
        Self { known_files }
    }
}

const CANDIDATE_EXTENSIONS: &[&str] = &["rs", "py", "ts", "tsx", "js", "jsx", "go", "java"];
const INDEX_STEMS: &[&str] = &["mod", "index", "__init__"];

impl Resolver for PathResolver<'_> {
    fn resolve(&self, import_str: &str, importer_path: &str, _root: &Path) -> Option<String> {
        if self.is_external(import_str) {
            return None;
        }
        let importer_dir = Path::new(importer_path).parent().unwrap_or_else(|| Path::new(""));
        let joined = normalize(&importer_dir.join(import_str.trim_start_matches('/')));

        if self.known_files.contains(&joined) {
            return Some(joined);
        }
        for ext in CANDIDATE_EXTENSIONS {
            let candidate = format!("{joined}.{ext}");
            if self.known_files.contains(&candidate) {
                return Some(candidate);
            }
        }
        for stem in INDEX_STEMS {
            for ext in CANDIDATE_EXTENSIONS {
                let candidate = format!("{joined}/{stem}.{ext}");
                if self.known_files.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

fn normalize(path: &Path) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for component in path.components() {
        match component.as_os_str().to_str().unwrap_or("") {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> HashSet<String> {
        paths.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_relative_sibling_import() {
        let known = files(&["src/a.rs", "src/b.rs"]);
        let resolver = PathResolver::new(&known);
        assert_eq!(resolver.resolve("./b", "src/a.rs", Path::new(".")), Some("src/b.rs".to_string()));
    }

    #[test]
    fn external_package_import_resolves_to_none() {
        let known = files(&["src/a.rs"]);
        let resolver = PathResolver::new(&known);
        assert!(resolver.is_external("serde"));
        assert_eq!(resolver.resolve("serde", "src/a.rs", Path::new(".")), None);
    }

    #[test]
    fn phantom_import_resolves_to_none_but_is_internal() {
        let known = files(&["src/a.rs"]);
        let resolver = PathResolver::new(&known);
        assert!(!resolver.is_external("./missing"));
        assert_eq!(resolver.resolve("./missing", "src/a.rs", Path::new(".")), None);
    }

    #[test]
    fn resolves_directory_import_via_mod_rs() {
        let known = files(&["src/util/mod.rs"]);
        let resolver = PathResolver::new(&known);
        assert_eq!(resolver.resolve("./util", "src/a.rs", Path::new(".")), Some("src/util/mod.rs".to_string()));
    }
}
