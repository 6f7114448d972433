//! Finders (spec 4.8): pure predicates over the fact store that surface
//! the 22 named finding types. 21 are atom-driven predicates registered
//! in [`registry`]; `CHRONIC_PROBLEM` is a post-rank severity amplifier
//! implemented in `core::rank`.

pub mod common;
pub mod context;
pub mod file_finders;
pub mod global_finders;
pub mod module_finders;
pub mod pair_finders;
pub mod registry;
pub mod types;

pub use context::DetectionContext;
pub use registry::{build_finder_registry, is_available, run_all, Finder};
pub use types::{validate_atom, AtomSpec, Finding, FindingId, Op, Scope, TriggeredAtom};
