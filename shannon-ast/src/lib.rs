//! shannon-ast: the narrow structural IR the core analysis engine consumes.
//!
//! This crate deliberately contains no parsing logic. It is the seam
//! described by the core's "Parser interface (consumed)" and "Import
//! resolver interface (consumed)" sections: a per-language front end (tree-
//! sitter based or otherwise) produces these types; the core only ever reads
//! them.

pub mod ir;

pub use ir::{
    ClassDef, FileMetrics, FileSyntax, FunctionDef, ImportDecl, ImportKind, Language, Location,
    Span,
};
