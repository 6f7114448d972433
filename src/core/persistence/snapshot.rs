//! Embedded snapshot store (spec 6.4): one row per analysis run, plus
//! per-finding lifecycle and per-signal history tables used by
//! [`super::diff`].

use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::blackboard::{FactStore, SignalId};
use crate::core::error::{InsightError, Result};

use super::diff::FindingLifecycleStatus;
use super::schema::init_schema;

/// Major version of the snapshot blob envelope. Bumped whenever the
/// `FactStore` shape changes incompatibly; old blobs are rejected rather
/// than guessed at (spec 6.4, invariant 11).
const SNAPSHOT_SCHEMA_MAJOR: u32 = 1;

pub struct SnapshotMeta {
    pub id: String,
    pub timestamp: i64,
    pub commit_sha: Option<String>,
    pub file_count: usize,
    pub finding_count: usize,
    pub health: f64,
}

pub struct SnapshotStore {
    conn: Connection,
}

impl SnapshotStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| InsightError::persistence(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| InsightError::persistence(e.to_string()))?;
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn save_snapshot(&self, meta: &SnapshotMeta, store: &FactStore) -> Result<()> {
        let blob = encode_snapshot(store)?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO snapshots (id, timestamp, commit_sha, data, file_count, finding_count, health)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    meta.id,
                    meta.timestamp,
                    meta.commit_sha,
                    blob,
                    meta.file_count as i64,
                    meta.finding_count as i64,
                    meta.health,
                ],
            )
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        self.record_signal_history(&meta.id, store)
    }

    fn record_signal_history(&self, snapshot_id: &str, store: &FactStore) -> Result<()> {
        for signal in store.populated_signals().collect::<Vec<_>>() {
            for (entity, value) in store.signal_values(signal) {
                let Some(v) = value.as_f64() else { continue };
                self.conn
                    .execute(
                        "INSERT OR REPLACE INTO signal_history (entity_key, signal, snapshot_id, value)
                         VALUES (?1, ?2, ?3, ?4)",
                        params![entity.key(), format!("{signal:?}"), snapshot_id, v],
                    )
                    .map_err(|e| InsightError::persistence(e.to_string()))?;
            }
        }
        Ok(())
    }

    pub fn load_snapshot(&self, id: &str) -> Result<Option<FactStore>> {
        let blob: Option<Vec<u8>> = self
            .conn
            .query_row("SELECT data FROM snapshots WHERE id = ?1", params![id], |row| row.get::<_, Vec<u8>>(0))
            .optional()
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        blob.map(|b| decode_snapshot(&b)).transpose()
    }

    /// Snapshot ids ordered oldest-first.
    pub fn list_snapshot_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM snapshots ORDER BY timestamp ASC")
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(|e| InsightError::persistence(e.to_string()))
    }

    /// `(snapshot_id, value)` history for one entity+signal, oldest first.
    pub fn signal_series(&self, entity_key: &str, signal: SignalId) -> Result<Vec<f64>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT sh.value FROM signal_history sh
                 JOIN snapshots s ON s.id = sh.snapshot_id
                 WHERE sh.entity_key = ?1 AND sh.signal = ?2
                 ORDER BY s.timestamp ASC",
            )
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        let rows = stmt
            .query_map(params![entity_key, format!("{signal:?}")], |row| row.get::<_, f64>(0))
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(|e| InsightError::persistence(e.to_string()))
    }

    pub fn record_finding_lifecycle(
        &self,
        snapshot_id: &str,
        statuses: &HashMap<String, FindingLifecycleStatus>,
        previous_counts: &HashMap<String, usize>,
    ) -> Result<()> {
        let now = snapshot_id;
        for (finding_id, status) in statuses {
            let status_str = match status {
                FindingLifecycleStatus::Resolved => "resolved",
                _ => "open",
            };
            let persistence_count = match status {
                FindingLifecycleStatus::Persisting | FindingLifecycleStatus::Regression => {
                    previous_counts.get(finding_id).copied().unwrap_or(0) + 1
                }
                FindingLifecycleStatus::New => 1,
                FindingLifecycleStatus::Resolved => previous_counts.get(finding_id).copied().unwrap_or(0),
            };
            self.conn
                .execute(
                    "INSERT OR REPLACE INTO finding_lifecycle
                     (finding_id, snapshot_id, status, first_seen, last_seen, persistence_count)
                     VALUES (?1, ?2, ?3, COALESCE((SELECT first_seen FROM finding_lifecycle WHERE finding_id = ?1 ORDER BY snapshot_id LIMIT 1), ?4), ?4, ?5)",
                    params![finding_id, snapshot_id, status_str, now, persistence_count as i64],
                )
                .map_err(|e| InsightError::persistence(e.to_string()))?;
        }
        Ok(())
    }

    /// Current persistence counts for every finding id with an `open`
    /// status in `snapshot_id`, used to feed `rank::apply_chronic_amplification`.
    pub fn persistence_counts(&self, snapshot_id: &str) -> Result<HashMap<String, usize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT finding_id, persistence_count FROM finding_lifecycle WHERE snapshot_id = ?1 AND status = 'open'")
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        let rows = stmt
            .query_map(params![snapshot_id], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize)))
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        let mut result = HashMap::new();
        for row in rows {
            let (id, count) = row.map_err(|e| InsightError::persistence(e.to_string()))?;
            result.insert(id, count);
        }
        Ok(result)
    }
}

fn encode_snapshot(store: &FactStore) -> Result<Vec<u8>> {
    let payload = bincode::serialize(store).map_err(|e| InsightError::persistence(e.to_string()))?;
    let mut buf = Vec::with_capacity(4 + payload.len());
    buf.extend_from_slice(&SNAPSHOT_SCHEMA_MAJOR.to_le_bytes());
    buf.extend_from_slice(&payload);
    Ok(buf)
}

fn decode_snapshot(bytes: &[u8]) -> Result<FactStore> {
    if bytes.len() < 4 {
        return Err(InsightError::persistence("truncated snapshot blob"));
    }
    let major = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
    if major != SNAPSHOT_SCHEMA_MAJOR {
        return Err(InsightError::UnsupportedSnapshotVersion { got: major, max_supported: SNAPSHOT_SCHEMA_MAJOR });
    }
    bincode::deserialize(&bytes[4..]).map_err(|e| InsightError::persistence(e.to_string()))
}
