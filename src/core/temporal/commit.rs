//! The commit-stream interface the temporal analyzer consumes (spec 6.3).
//! Nothing in `core::temporal` holds a `git2::Repository` or shells out;
//! it only ever sees `Commit` values yielded by a `CommitStream`
//! implementation, which is an external collaborator. `core::temporal::
//! git_driver` provides one reference implementation over `git2`.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub author_email: String,
    pub timestamp_unix: i64,
    pub message: String,
    pub files: Vec<String>,
    /// `(old_path, new_path)` renames detected in this commit.
    pub renames: Vec<(String, String)>,
}

pub trait CommitStream {
    /// Yields every commit, in any order; the core sorts by timestamp
    /// itself (spec 6.3: "accepts the commit stream in any order").
    fn commits(&self) -> Result<Vec<Commit>>;
}

/// Normalizes a raw stream: lowercases author emails and sorts by
/// timestamp ascending, so every downstream computation can assume
/// chronological order.
pub fn normalize(mut commits: Vec<Commit>) -> Vec<Commit> {
    for commit in commits.iter_mut() {
        commit.author_email = commit.author_email.to_lowercase();
    }
    commits.sort_by_key(|c| c.timestamp_unix);
    commits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(sha: &str, ts: i64, email: &str) -> Commit {
        Commit {
            sha: sha.to_string(),
            author_email: email.to_string(),
            timestamp_unix: ts,
            message: String::new(),
            files: Vec::new(),
            renames: Vec::new(),
        }
    }

    #[test]
    fn normalize_sorts_by_timestamp_and_lowercases_email() {
        let commits = vec![commit("b", 200, "Bob@Example.com"), commit("a", 100, "alice@x.com")];
        let normalized = normalize(commits);
        assert_eq!(normalized[0].sha, "a");
        assert_eq!(normalized[1].author_email, "bob@example.com");
    }
}
