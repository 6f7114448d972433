//! Core IR types.
//!
//! Mirrors the data model described in the core's parser/resolver interfaces:
//! one [`FileMetrics`] + [`FileSyntax`] pair per source file, plus the
//! [`ImportDecl`] records an import resolver turns raw import strings into.
//!
//! All collections use deterministic ordering (insertion order, as produced
//! by the front end) so two runs over the same source produce identical IR.

use serde::{Deserialize, Serialize};

/// A contiguous byte range plus 1-indexed line bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub start_line: usize,
    pub end_line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, start_line: usize, end_line: usize) -> Self {
        Self {
            start,
            end,
            start_line,
            end_line,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// A single-point source location, 1-indexed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

/// Source language, detected by the front end from file extension/shebang.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Python,
    TypeScript,
    JavaScript,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Other,
}

impl Language {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyi" => Self::Python,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "go" => Self::Go,
            "java" => Self::Java,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" => Self::Cpp,
            "cs" => Self::CSharp,
            "rb" => Self::Ruby,
            _ => Self::Other,
        }
    }
}

/// Per-import resolution kind. External imports are dropped by the core
/// before they ever reach the relation graph; only `Phantom` survives as an
/// `UnresolvedEdge`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImportKind {
    /// Resolved to a file inside the project.
    Internal,
    /// Resolved to a third-party/stdlib package; filtered out upstream of
    /// the relation graph.
    External,
    /// Looked internal (relative-ish, no known package prefix) but did not
    /// resolve to any file on disk.
    Phantom,
}

/// A single import statement, after resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Raw import string as written in source (e.g. `"./utils/foo"`).
    pub source: String,
    /// Symbol names pulled in by this import, if the language distinguishes them.
    pub names: Vec<String>,
    /// Root-relative path of the target file, if resolution succeeded.
    pub resolved_path: Option<String>,
    pub kind: ImportKind,
    pub location: Location,
}

impl ImportDecl {
    pub fn is_external(&self) -> bool {
        matches!(self.kind, ImportKind::External)
    }

    pub fn is_phantom(&self) -> bool {
        matches!(self.kind, ImportKind::Phantom)
    }
}

/// A function or method body, as seen by the front end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: String,
    /// Tokens of the parameter list / return type (used by naming + TF-IDF).
    pub signature_tokens: Vec<String>,
    /// Tokens of the function body (used by TF-IDF, concept extraction, NCD input).
    pub body_tokens: Vec<String>,
    /// Front end's own stub determination; `None` means "ask
    /// `is_stub_heuristic`", which is the core's canonical fallback.
    pub is_stub: Option<bool>,
    pub nesting_depth: usize,
    pub body_span: Span,
    pub has_doc_comment: bool,
    pub parameter_count: usize,
}

impl FunctionDef {
    /// Canonical stub determination (spec 6.1): front ends may leave
    /// `is_stub` unset and let the core decide from token count / body shape.
    pub fn resolve_is_stub(&self, body_source: Option<&str>) -> bool {
        if let Some(explicit) = self.is_stub {
            return explicit;
        }
        if self.body_tokens.len() < 5 {
            return true;
        }
        if let Some(src) = body_source {
            let trimmed = src.trim();
            return trimmed == "pass"
                || trimmed == "..."
                || trimmed == "return None"
                || trimmed == "return"
                || trimmed.is_empty();
        }
        false
    }
}

/// A class/struct/interface/trait declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassDef {
    pub name: String,
    pub bases: Vec<String>,
    pub is_abstract: bool,
    pub fields: Vec<String>,
    pub methods: Vec<FunctionDef>,
    pub has_doc_comment: bool,
}

/// Summary counters for a file, cheap to compute without a full parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetrics {
    pub path: String,
    pub language: Language,
    pub lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub import_count: usize,
    pub imports: Vec<String>,
}

/// Full structural model for a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSyntax {
    pub path: String,
    pub functions: Vec<FunctionDef>,
    pub classes: Vec<ClassDef>,
    pub max_nesting: usize,
    pub has_main_guard: bool,
    pub imports: Vec<ImportDecl>,
    pub todo_count: usize,
}

impl FileSyntax {
    pub fn function_count(&self) -> usize {
        self.functions.len() + self.classes.iter().map(|c| c.methods.len()).sum::<usize>()
    }

    pub fn docstring_coverage(&self) -> f64 {
        let total = self.function_count() + self.classes.len();
        if total == 0 {
            return 0.0;
        }
        let documented = self.functions.iter().filter(|f| f.has_doc_comment).count()
            + self
                .classes
                .iter()
                .map(|c| {
                    (c.has_doc_comment as usize)
                        + c.methods.iter().filter(|m| m.has_doc_comment).count()
                })
                .sum::<usize>();
        documented as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stub_fn(tokens: usize) -> FunctionDef {
        FunctionDef {
            name: "f".into(),
            signature_tokens: vec![],
            body_tokens: vec!["t".into(); tokens],
            is_stub: None,
            nesting_depth: 0,
            body_span: Span::default(),
            has_doc_comment: false,
            parameter_count: 0,
        }
    }

    #[test]
    fn short_body_is_stub() {
        assert!(stub_fn(3).resolve_is_stub(None));
    }

    #[test]
    fn long_body_is_not_stub() {
        assert!(!stub_fn(20).resolve_is_stub(Some("a meaningful body with real work done here")));
    }

    #[test]
    fn pass_body_is_stub() {
        let f = stub_fn(10);
        assert!(f.resolve_is_stub(Some("pass")));
    }

    #[test]
    fn explicit_flag_wins() {
        let mut f = stub_fn(20);
        f.is_stub = Some(true);
        assert!(f.resolve_is_stub(Some("a meaningful body with real work done here")));
    }

    #[test]
    fn docstring_coverage_counts_classes_and_methods() {
        let syntax = FileSyntax {
            path: "x.rs".into(),
            functions: vec![],
            classes: vec![ClassDef {
                name: "C".into(),
                bases: vec![],
                is_abstract: false,
                fields: vec![],
                methods: vec![stub_fn(10)],
                has_doc_comment: true,
            }],
            max_nesting: 0,
            has_main_guard: false,
            imports: vec![],
            todo_count: 0,
        };
        // 1 class (documented) + 1 method (undocumented) = 1/2
        assert!((syntax.docstring_coverage() - 0.5).abs() < 1e-9);
    }
}
