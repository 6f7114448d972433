//! Reference `CommitStream` implementation over `git2` (spec 6.3). This is
//! an external-collaborator adapter, not part of the analytical core: it
//! exists so the engine is runnable end-to-end without a second repo
//! supplying history, but `core::temporal`'s analysis functions never call
//! into this module directly.

#![cfg(feature = "temporal")]

use std::path::Path;

use git2::{Repository, Sort};

use super::commit::{Commit, CommitStream};
use crate::core::error::{InsightError, Result};

pub struct GitCommitStream {
    repo_path: std::path::PathBuf,
}

impl GitCommitStream {
    pub fn open(root: &Path) -> Result<Self> {
        Repository::open(root).map_err(|e| InsightError::persistence(e.to_string()))?;
        Ok(Self {
            repo_path: root.to_path_buf(),
        })
    }
}

impl CommitStream for GitCommitStream {
    fn commits(&self) -> Result<Vec<Commit>> {
        let repo = Repository::open(&self.repo_path)
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        let mut revwalk = repo
            .revwalk()
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        revwalk
            .set_sorting(Sort::TIME)
            .map_err(|e| InsightError::persistence(e.to_string()))?;
        revwalk
            .push_head()
            .map_err(|e| InsightError::persistence(e.to_string()))?;

        let mut commits = Vec::new();
        for oid_result in revwalk {
            let oid = match oid_result {
                Ok(oid) => oid,
                Err(_) => continue,
            };
            let commit = match repo.find_commit(oid) {
                Ok(c) => c,
                Err(_) => continue,
            };
            let author = commit.author();
            let author_email = author.email().unwrap_or("unknown").to_string();
            let message = commit.message().unwrap_or("").to_string();
            let timestamp_unix = commit.time().seconds();

            let mut files = Vec::new();
            let mut renames = Vec::new();
            if let Ok(tree) = commit.tree() {
                let parent_tree = commit.parent(0).ok().and_then(|p| p.tree().ok());
                if let Ok(mut diff) =
                    repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), None)
                {
                    let mut opts = git2::DiffFindOptions::new();
                    opts.renames(true);
                    let _ = diff.find_similar(Some(&mut opts));
                    diff.foreach(
                        &mut |delta, _| {
                            if let Some(new_path) = delta.new_file().path() {
                                files.push(new_path.to_string_lossy().to_string());
                            }
                            if delta.status() == git2::Delta::Renamed {
                                if let (Some(old), Some(new)) =
                                    (delta.old_file().path(), delta.new_file().path())
                                {
                                    renames.push((
                                        old.to_string_lossy().to_string(),
                                        new.to_string_lossy().to_string(),
                                    ));
                                }
                            }
                            true
                        },
                        None,
                        None,
                        None,
                    )
                    .ok();
                }
            }

            commits.push(Commit {
                sha: oid.to_string(),
                author_email,
                timestamp_unix,
                message,
                files,
                renames,
            });
        }
        Ok(commits)
    }
}
