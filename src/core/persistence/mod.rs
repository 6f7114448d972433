//! Embedded snapshot store + signal/finding diffing across runs (spec 4.10,
//! 6.4). The fact store itself doesn't know this exists; a snapshot is the
//! whole `FactStore` serialized behind a versioned envelope, plus indexed
//! per-signal and per-finding history tables for cheap time-series queries.

pub mod diff;
pub mod schema;
pub mod snapshot;

pub use diff::{diff_findings, diff_signal_series, FindingLifecycleStatus, SignalDiff, Trend};
pub use snapshot::{SnapshotMeta, SnapshotStore};
