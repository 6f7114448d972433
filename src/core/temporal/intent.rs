//! Commit-message intent classification (spec 4.5): `fix_ratio` and
//! `refactor_ratio` over fixed, word-boundary-anchored regex classes.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref FIX_PATTERN: Regex =
        Regex::new(r"(?i)\b(fix|bug|patch|hotfix|resolve|repair)\b").unwrap();
    static ref REFACTOR_PATTERN: Regex =
        Regex::new(r"(?i)\b(refactor|restructure|reorganize|clean|simplify)\b").unwrap();
}

pub fn is_fix_commit(message: &str) -> bool {
    FIX_PATTERN.is_match(message)
}

pub fn is_refactor_commit(message: &str) -> bool {
    REFACTOR_PATTERN.is_match(message)
}

pub fn fix_ratio(messages: &[&str]) -> f64 {
    ratio(messages, is_fix_commit)
}

pub fn refactor_ratio(messages: &[&str]) -> f64 {
    ratio(messages, is_refactor_commit)
}

fn ratio(messages: &[&str], predicate: impl Fn(&str) -> bool) -> f64 {
    if messages.is_empty() {
        return 0.0;
    }
    let matched = messages.iter().filter(|m| predicate(m)).count();
    matched as f64 / messages.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fix_pattern_matches_common_phrasing() {
        assert!(is_fix_commit("Fix null pointer in parser"));
        assert!(is_fix_commit("hotfix: crash on startup"));
        assert!(!is_fix_commit("add new feature"));
    }

    #[test]
    fn refactor_pattern_matches_common_phrasing() {
        assert!(is_refactor_commit("refactor the resolver module"));
        assert!(is_refactor_commit("simplify churn calculation"));
        assert!(!is_refactor_commit("fix the crash"));
    }

    #[test]
    fn word_boundary_avoids_substring_false_positives() {
        // "prefixed" contains "fix" but not as a whole word.
        assert!(!is_fix_commit("prefixed all config keys"));
    }

    #[test]
    fn empty_message_list_has_zero_ratios() {
        assert_eq!(fix_ratio(&[]), 0.0);
        assert_eq!(refactor_ratio(&[]), 0.0);
    }
}
