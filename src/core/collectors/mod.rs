//! Collect stage (spec 5, 6.1, 6.2): directory traversal, a pluggable
//! parser seam producing `shannon-ast` IR, and a pluggable import resolver.
//! No language grammar lives in `core` itself; [`shannon_ast_adapter`] is
//! the minimal reference front end that makes the crate runnable without an
//! external toolchain.

pub mod resolver;
pub mod shannon_ast_adapter;
pub mod walker;

pub use resolver::{PathResolver, Resolver};
pub use shannon_ast_adapter::{resolve_imports, HeuristicParser, Parser};
pub use walker::{DefaultWalker, FileWalker};
