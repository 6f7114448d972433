//! Persistent cache for the raw commit stream, keyed on git HEAD so a
//! repeat scan can skip re-walking history entirely. Invalidation is a
//! triple check: format version, TTL, and current HEAD hash.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::commit::Commit;

const CACHE_DIR: &str = ".shannon-insight/cache/temporal";
const CACHE_FILE: &str = "commits.bin";
const CACHE_TTL_SECONDS: u64 = 86400;
const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitCache {
    pub version: u32,
    pub git_head_hash: String,
    pub created_at: u64,
    pub ttl_seconds: u64,
    pub commits: Vec<Commit>,
}

pub struct TemporalCache {
    cache_dir: PathBuf,
    repo_root: PathBuf,
}

impl TemporalCache {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            cache_dir: repo_root.join(CACHE_DIR),
            repo_root: repo_root.to_path_buf(),
        }
    }

    fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(CACHE_FILE)
    }

    /// Returns cached commits if the cache is present, version-matched,
    /// unexpired, and still at the current HEAD. `None` on any mismatch,
    /// so the caller always has a clean fallback: re-walk history.
    pub fn load(&self) -> Option<Vec<Commit>> {
        let cache_path = self.cache_path();
        if !cache_path.exists() {
            return None;
        }
        let mut file = File::open(&cache_path).ok()?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer).ok()?;
        let cache: CommitCache = bincode::deserialize(&buffer).ok()?;

        if cache.version != CACHE_VERSION {
            return None;
        }
        let now = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_secs();
        if now.saturating_sub(cache.created_at) > cache.ttl_seconds {
            return None;
        }
        let current_head = self.git_head_hash()?;
        if cache.git_head_hash != current_head {
            return None;
        }
        Some(cache.commits)
    }

    pub fn save(&self, commits: &[Commit]) -> std::io::Result<()> {
        let git_head_hash = match self.git_head_hash() {
            Some(h) => h,
            None => return Ok(()),
        };
        fs::create_dir_all(&self.cache_dir)?;
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let cache = CommitCache {
            version: CACHE_VERSION,
            git_head_hash,
            created_at: now,
            ttl_seconds: CACHE_TTL_SECONDS,
            commits: commits.to_vec(),
        };
        let buffer = bincode::serialize(&cache)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        let cache_path = self.cache_path();
        let temp_path = cache_path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(&buffer)?;
        file.sync_all()?;
        fs::rename(&temp_path, &cache_path)?;
        Ok(())
    }

    pub fn invalidate(&self) -> std::io::Result<()> {
        let cache_path = self.cache_path();
        if cache_path.exists() {
            fs::remove_file(&cache_path)?;
        }
        Ok(())
    }

    fn git_head_hash(&self) -> Option<String> {
        let git_dir = self.repo_root.join(".git");
        let head_path = if git_dir.is_file() {
            let content = fs::read_to_string(&git_dir).ok()?;
            let git_dir_path = content.strip_prefix("gitdir: ")?.trim();
            PathBuf::from(git_dir_path).join("HEAD")
        } else {
            git_dir.join("HEAD")
        };
        let head_content = fs::read_to_string(&head_path).ok()?;
        if let Some(ref_path) = head_content.strip_prefix("ref: ") {
            let ref_path = ref_path.trim();
            let full_ref_path = if git_dir.is_file() {
                let content = fs::read_to_string(&git_dir).ok()?;
                let git_dir_path = content.strip_prefix("gitdir: ")?.trim();
                PathBuf::from(git_dir_path).parent()?.join(ref_path)
            } else {
                git_dir.join(ref_path)
            };
            fs::read_to_string(&full_ref_path).ok().map(|s| s.trim().to_string())
        } else {
            Some(head_content.trim().to_string())
        }
    }
}
