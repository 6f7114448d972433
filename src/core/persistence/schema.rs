//! SQLite schema for the embedded snapshot store (spec 6.4).

use rusqlite::Connection;

use crate::core::error::{InsightError, Result};

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS snapshots (
            id TEXT PRIMARY KEY,
            timestamp INTEGER NOT NULL,
            commit_sha TEXT,
            data BLOB NOT NULL,
            file_count INTEGER NOT NULL,
            finding_count INTEGER NOT NULL,
            health REAL NOT NULL
        );

        CREATE TABLE IF NOT EXISTS finding_lifecycle (
            finding_id TEXT NOT NULL,
            snapshot_id TEXT NOT NULL,
            status TEXT NOT NULL,
            first_seen TEXT NOT NULL,
            last_seen TEXT NOT NULL,
            persistence_count INTEGER NOT NULL,
            PRIMARY KEY (finding_id, snapshot_id)
        );

        CREATE TABLE IF NOT EXISTS signal_history (
            entity_key TEXT NOT NULL,
            signal TEXT NOT NULL,
            snapshot_id TEXT NOT NULL,
            value REAL NOT NULL,
            PRIMARY KEY (entity_key, signal, snapshot_id)
        );

        CREATE INDEX IF NOT EXISTS idx_snapshots_timestamp ON snapshots(timestamp);
        CREATE INDEX IF NOT EXISTS idx_lifecycle_finding ON finding_lifecycle(finding_id);
        CREATE INDEX IF NOT EXISTS idx_signal_history_entity ON signal_history(entity_key, signal);
        ",
    )
    .map_err(|e| InsightError::persistence(e.to_string()))
}
