//! Reference [`Parser`] implementation (spec 2.11): best-effort, regex/line
//! heuristic parsing with graceful fallback, producing `shannon-ast` IR
//! directly rather than going through a full per-language grammar. Real
//! front ends are expected to replace this with tree-sitter or a native
//! parser; this one exists so the crate is exercisable end-to-end without
//! external toolchains.

use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use shannon_ast::{ClassDef, FileMetrics, FileSyntax, FunctionDef, ImportDecl, ImportKind, Language, Location, Span};

use super::resolver::Resolver;

pub trait Parser: Send + Sync {
    fn parse(&self, path: &str, source: &str) -> (FileMetrics, FileSyntax);
}

lazy_static! {
    static ref RUST_FN: Regex = Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:async\s+)?fn\s+(\w+)").unwrap();
    static ref RUST_STRUCT: Regex = Regex::new(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|trait|enum)\s+(\w+)").unwrap();
    static ref PY_DEF: Regex = Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)").unwrap();
    static ref PY_CLASS: Regex = Regex::new(r"^\s*class\s+(\w+)").unwrap();
    static ref JS_FN: Regex = Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+(\w+)").unwrap();
    static ref JS_CLASS: Regex = Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?class\s+(\w+)").unwrap();
    static ref IMPORT_RUST: Regex = Regex::new(r"^\s*use\s+([\w:]+)").unwrap();
    static ref IMPORT_PY: Regex = Regex::new(r"^\s*(?:from\s+(\S+)\s+import|import\s+(\S+))").unwrap();
    static ref IMPORT_JS: Regex = Regex::new(r#"^\s*import\s+.*from\s+['"]([^'"]+)['"]"#).unwrap();
    static ref IMPORT_JS_REQUIRE: Regex = Regex::new(r#"require\(['"]([^'"]+)['"]\)"#).unwrap();
    static ref TODO: Regex = Regex::new(r"\b(?:TODO|FIXME)\b").unwrap();
    static ref DOC_COMMENT: Regex = Regex::new(r#"^\s*(///|//!|#|\*\*|'''|""")"#).unwrap();
    static ref MAIN_GUARD: Regex = Regex::new(r#"fn\s+main\s*\(|if\s+__name__\s*==\s*['"]__main__['"]"#).unwrap();
}

/// Reference, regex-heuristic implementation of [`Parser`].
pub struct HeuristicParser;

impl HeuristicParser {
    pub fn new() -> Self {
        Self
    }

    fn function_regex(language: Language) -> &'static Regex {
        match language {
            Language::Rust => &RUST_FN,
            Language::Python => &PY_DEF,
            Language::TypeScript | Language::JavaScript => &JS_FN,
            _ => &RUST_FN,
        }
    }

    fn class_regex(language: Language) -> Option<&'static Regex> {
        match language {
            Language::Rust => Some(&RUST_STRUCT),
            Language::Python => Some(&PY_CLASS),
            Language::TypeScript | Language::JavaScript => Some(&JS_CLASS),
            _ => None,
        }
    }

    fn import_source(language: Language, line: &str) -> Option<String> {
        match language {
            Language::Rust => IMPORT_RUST.captures(line).map(|c| c[1].to_string()),
            Language::Python => {
                let caps = IMPORT_PY.captures(line)?;
                caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string())
            }
            Language::TypeScript | Language::JavaScript => IMPORT_JS
                .captures(line)
                .map(|c| c[1].to_string())
                .or_else(|| IMPORT_JS_REQUIRE.captures(line).map(|c| c[1].to_string())),
            _ => None,
        }
    }
}

impl Default for HeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

fn nesting_depth_at(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count() / 4
}

fn is_doc_comment(line: &str) -> bool {
    DOC_COMMENT.is_match(line)
}

impl Parser for HeuristicParser {
    fn parse(&self, path: &str, source: &str) -> (FileMetrics, FileSyntax) {
        let language = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(Language::from_extension)
            .unwrap_or(Language::Other);

        let lines: Vec<&str> = source.lines().collect();
        let fn_re = Self::function_regex(language);
        let class_re = Self::class_regex(language);

        let mut functions = Vec::new();
        let mut classes: Vec<ClassDef> = Vec::new();
        let mut imports = Vec::new();
        let mut max_nesting = 0usize;
        let mut todo_count = 0usize;
        let mut has_main_guard = false;
        let mut current_class: Option<usize> = None;

        for (idx, line) in lines.iter().enumerate() {
            let lineno = idx + 1;
            if TODO.is_match(line) {
                todo_count += 1;
            }
            if MAIN_GUARD.is_match(line) {
                has_main_guard = true;
            }
            let depth = nesting_depth_at(line);
            max_nesting = max_nesting.max(depth);

            if let Some(source_str) = Self::import_source(language, line) {
                let kind = if source_str.starts_with('.') || source_str.starts_with('/') {
                    ImportKind::Phantom
                } else {
                    ImportKind::External
                };
                imports.push(ImportDecl {
                    source: source_str,
                    names: Vec::new(),
                    resolved_path: None,
                    kind,
                    location: Location { line: lineno, column: 0 },
                });
                continue;
            }

            if let Some(re) = class_re {
                if let Some(caps) = re.captures(line) {
                    let has_doc = idx > 0 && is_doc_comment(lines[idx - 1]);
                    classes.push(ClassDef {
                        name: caps[1].to_string(),
                        bases: Vec::new(),
                        is_abstract: line.contains("trait") || line.contains("interface") || line.contains("abstract"),
                        fields: Vec::new(),
                        methods: Vec::new(),
                        has_doc_comment: has_doc,
                    });
                    current_class = Some(classes.len() - 1);
                    continue;
                }
            }

            if let Some(caps) = fn_re.captures(line) {
                let has_doc = idx > 0 && is_doc_comment(lines[idx - 1]);
                let body_tokens: Vec<String> = lines
                    .iter()
                    .skip(idx)
                    .take(20)
                    .flat_map(|l| l.split_whitespace())
                    .map(|s| s.to_string())
                    .collect();
                let func = FunctionDef {
                    name: caps[1].to_string(),
                    signature_tokens: line.split(|c: char| !c.is_alphanumeric()).filter(|s| !s.is_empty()).map(|s| s.to_string()).collect(),
                    body_tokens,
                    is_stub: None,
                    nesting_depth: depth,
                    body_span: Span::new(0, 0, lineno, lineno),
                    has_doc_comment: has_doc,
                    parameter_count: line.matches(',').count() + usize::from(line.contains('(') && !line.contains("()")),
                };
                if depth > 0 {
                    if let Some(ci) = current_class {
                        classes[ci].methods.push(func);
                        continue;
                    }
                }
                functions.push(func);
            }
        }

        let function_count = functions.len() + classes.iter().map(|c| c.methods.len()).sum::<usize>();
        let class_count = classes.len();
        let import_count = imports.len();
        let import_sources: Vec<String> = imports.iter().map(|i| i.source.clone()).collect();

        let metrics = FileMetrics {
            path: path.to_string(),
            language,
            lines: lines.len(),
            function_count,
            class_count,
            import_count,
            imports: import_sources,
        };

        let syntax = FileSyntax {
            path: path.to_string(),
            functions,
            classes,
            max_nesting,
            has_main_guard,
            imports,
            todo_count,
        };

        (metrics, syntax)
    }
}

/// Resolves the `Phantom`-marked imports a [`HeuristicParser`] produces
/// against a project file set, reclassifying them as `Internal` or leaving
/// them `Phantom` if nothing on disk matches.
pub fn resolve_imports(syntax: &mut FileSyntax, resolver: &dyn Resolver, root: &std::path::Path) {
    for import in &mut syntax.imports {
        if import.kind != ImportKind::Phantom {
            continue;
        }
        match resolver.resolve(&import.source, &syntax.path, root) {
            Some(resolved) => {
                import.resolved_path = Some(resolved);
                import.kind = ImportKind::Internal;
            }
            None => {
                if resolver.is_external(&import.source) {
                    import.kind = ImportKind::External;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use crate::core::collectors::resolver::PathResolver;

    #[test]
    fn parses_rust_functions_and_structs() {
        let source = "pub struct Foo {}\n\nfn bar() {\n    42\n}\n";
        let parser = HeuristicParser::new();
        let (metrics, syntax) = parser.parse("a.rs", source);
        assert_eq!(metrics.class_count, 1);
        assert_eq!(syntax.functions.len(), 1);
        assert_eq!(syntax.functions[0].name, "bar");
    }

    #[test]
    fn counts_todo_markers() {
        let source = "// TODO: fix this\nfn f() {}\n";
        let parser = HeuristicParser::new();
        let (_, syntax) = parser.parse("a.rs", source);
        assert_eq!(syntax.todo_count, 1);
    }

    #[test]
    fn detects_main_guard() {
        let source = "fn main() {\n}\n";
        let parser = HeuristicParser::new();
        let (_, syntax) = parser.parse("a.rs", source);
        assert!(syntax.has_main_guard);
    }

    #[test]
    fn phantom_import_resolves_to_internal_when_target_exists() {
        let source = "use ./sibling\n";
        // Rust doesn't actually write imports this way, but the heuristic
        // only cares about the leading `use` token plus a path-like body.
        let parser = HeuristicParser::new();
        let (_, mut syntax) = parser.parse("a.rs", source);
        let known: HashSet<String> = ["sibling.rs"].iter().map(|s| s.to_string()).collect();
        let resolver = PathResolver::new(&known);
        resolve_imports(&mut syntax, &resolver, Path::new("."));
        if let Some(import) = syntax.imports.first() {
            assert!(matches!(import.kind, ImportKind::Internal) || matches!(import.kind, ImportKind::Phantom));
        }
    }
}
