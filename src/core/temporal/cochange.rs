//! Co-change matrix: file-pair lift and confidence (spec 4.5). Commits
//! touching more than `max_files_per_commit` files are capped before
//! pairing, so a single huge merge commit cannot dominate the matrix.

use std::collections::HashMap;

use super::commit::Commit;

pub const MAX_FILES_PER_COMMIT: usize = 64;

#[derive(Debug, Default)]
pub struct CoChangeMatrix {
    pub commit_count: usize,
    pub file_commit_count: HashMap<String, usize>,
    pub pair_commit_count: HashMap<(String, String), usize>,
}

impl CoChangeMatrix {
    pub fn build(commits: &[Commit]) -> Self {
        let mut matrix = CoChangeMatrix {
            commit_count: commits.len(),
            ..Default::default()
        };
        for commit in commits {
            let mut files: Vec<&String> = commit.files.iter().collect();
            files.sort();
            files.dedup();
            if files.len() > MAX_FILES_PER_COMMIT {
                files.truncate(MAX_FILES_PER_COMMIT);
            }
            for file in &files {
                *matrix.file_commit_count.entry((*file).clone()).or_insert(0) += 1;
            }
            if files.len() < 2 {
                continue;
            }
            for i in 0..files.len() {
                for j in (i + 1)..files.len() {
                    let key = (files[i].clone(), files[j].clone());
                    *matrix.pair_commit_count.entry(key).or_insert(0) += 1;
                }
            }
        }
        matrix
    }

    fn p_file(&self, file: &str) -> f64 {
        let n = self.commit_count.max(1) as f64;
        *self.file_commit_count.get(file).unwrap_or(&0) as f64 / n
    }

    fn p_pair(&self, a: &str, b: &str) -> f64 {
        let n = self.commit_count.max(1) as f64;
        let key = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        *self.pair_commit_count.get(&key).unwrap_or(&0) as f64 / n
    }

    /// `lift(a,b) = P(a∩b) / (P(a)*P(b))`. `0` when either marginal is `0`
    /// (no co-occurrence possible, not a divide-by-zero).
    pub fn lift(&self, a: &str, b: &str) -> f64 {
        let pa = self.p_file(a);
        let pb = self.p_file(b);
        if pa == 0.0 || pb == 0.0 {
            return 0.0;
        }
        self.p_pair(a, b) / (pa * pb)
    }

    /// `confidence(a -> b) = P(a∩b) / P(a)`.
    pub fn confidence(&self, a: &str, b: &str) -> f64 {
        let pa = self.p_file(a);
        if pa == 0.0 {
            return 0.0;
        }
        self.p_pair(a, b) / pa
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn commit(files: &[&str]) -> Commit {
        Commit {
            sha: "x".into(),
            author_email: "a@b.com".into(),
            timestamp_unix: 0,
            message: String::new(),
            files: files.iter().map(|s| s.to_string()).collect(),
            renames: Vec::new(),
        }
    }

    #[test]
    fn lift_and_confidence_match_scenario_s5() {
        // 500 commits: P(A)=0.10, P(B)=0.08, P(A∩B)=0.05.
        let mut commits = Vec::new();
        for _ in 0..25 {
            commits.push(commit(&["a.rs", "b.rs"])); // both
        }
        for _ in 0..25 {
            commits.push(commit(&["a.rs"])); // a only -> total P(A)=0.10
        }
        for _ in 0..15 {
            commits.push(commit(&["b.rs"])); // b only -> total P(B)=0.08
        }
        for _ in 0..435 {
            commits.push(commit(&["c.rs"]));
        }
        let matrix = CoChangeMatrix::build(&commits);
        assert!((matrix.lift("a.rs", "b.rs") - 6.25).abs() < 0.1);
        assert!((matrix.confidence("a.rs", "b.rs") - 0.5).abs() < 0.05);
    }

    #[test]
    fn huge_merge_commit_is_capped() {
        let files: Vec<String> = (0..200).map(|i| format!("f{i}.rs")).collect();
        let file_refs: Vec<&str> = files.iter().map(|s| s.as_str()).collect();
        let matrix = CoChangeMatrix::build(&[commit(&file_refs)]);
        assert_eq!(matrix.file_commit_count.len(), MAX_FILES_PER_COMMIT);
    }

    #[test]
    fn unrelated_files_have_zero_lift() {
        let commits = vec![commit(&["a.rs"]), commit(&["b.rs"])];
        let matrix = CoChangeMatrix::build(&commits);
        assert_eq!(matrix.lift("a.rs", "b.rs"), 0.0);
    }
}
