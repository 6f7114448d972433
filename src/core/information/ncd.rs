//! Normalized Compression Distance (spec 4.4), with a MinHash + LSH
//! pre-filter for large corpora so the O(n^2) exact-NCD pass only runs on
//! candidate pairs that are plausibly similar.

use std::collections::{HashMap, HashSet};

use super::compression::compressed_len;

pub const CLONE_THRESHOLD: f64 = 0.3;
const MINHASH_CORPUS_THRESHOLD: usize = 1000;
const SHINGLE_K: usize = 5;
const NUM_PERMUTATIONS: usize = 128;
const LSH_BANDS: usize = 32;
const LSH_ROWS: usize = 4; // bands * rows = num_permutations

/// `(C(xy) - min(C(x), C(y))) / max(C(x), C(y))`.
pub fn ncd(a: &[u8], b: &[u8]) -> f64 {
    let ca = compressed_len(a) as f64;
    let cb = compressed_len(b) as f64;
    let mut combined = Vec::with_capacity(a.len() + b.len());
    combined.extend_from_slice(a);
    combined.extend_from_slice(b);
    let cab = compressed_len(&combined) as f64;
    let denom = ca.max(cb);
    if denom == 0.0 {
        return 0.0;
    }
    (cab - ca.min(cb)) / denom
}

fn shingles(bytes: &[u8]) -> HashSet<&[u8]> {
    if bytes.len() < SHINGLE_K {
        return std::iter::once(bytes).collect();
    }
    (0..=bytes.len() - SHINGLE_K)
        .map(|i| &bytes[i..i + SHINGLE_K])
        .collect()
}

/// A deterministic, cheap stand-in for a family of independent hash
/// functions: `h_i(x) = hash(x) ^ salt_i` where `salt_i` is derived from a
/// fixed seed sequence, not from wall-clock or RNG state.
fn hash_with_salt(shingle: &[u8], salt: u64) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    salt.hash(&mut hasher);
    shingle.hash(&mut hasher);
    hasher.finish()
}

fn minhash_signature(bytes: &[u8]) -> Vec<u64> {
    let shingle_set = shingles(bytes);
    (0..NUM_PERMUTATIONS)
        .map(|perm| {
            shingle_set
                .iter()
                .map(|s| hash_with_salt(s, perm as u64 * 0x9E3779B97F4A7C15))
                .min()
                .unwrap_or(0)
        })
        .collect()
}

fn estimated_jaccard(sig_a: &[u64], sig_b: &[u64]) -> f64 {
    let matches = sig_a.iter().zip(sig_b.iter()).filter(|(a, b)| a == b).count();
    matches as f64 / NUM_PERMUTATIONS as f64
}

/// Buckets signatures by band to find candidate pairs without comparing
/// every pair directly.
fn lsh_candidates(signatures: &[(usize, Vec<u64>)]) -> HashSet<(usize, usize)> {
    let mut buckets: HashMap<(usize, Vec<u64>), Vec<usize>> = HashMap::new();
    for &(idx, ref sig) in signatures {
        for band in 0..LSH_BANDS {
            let start = band * LSH_ROWS;
            let key = (band, sig[start..start + LSH_ROWS].to_vec());
            buckets.entry(key).or_default().push(idx);
        }
    }
    let mut candidates = HashSet::new();
    for members in buckets.values() {
        if members.len() < 2 {
            continue;
        }
        for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                let (a, b) = (members[i].min(members[j]), members[i].max(members[j]));
                candidates.insert((a, b));
            }
        }
    }
    candidates
}

/// Returns clone-candidate pairs `(i, j)` with `i < j` and their NCD, for
/// files `i`/`j` into `corpus`. Below `MINHASH_CORPUS_THRESHOLD` files,
/// every pair is compared exactly; above it, MinHash/LSH narrows the
/// candidate set to pairs with estimated Jaccard >= 0.5 first.
pub fn find_clone_pairs(corpus: &[Vec<u8>]) -> Vec<(usize, usize, f64)> {
    let n = corpus.len();
    let candidate_pairs: Vec<(usize, usize)> = if n >= MINHASH_CORPUS_THRESHOLD {
        let signatures: Vec<(usize, Vec<u64>)> = corpus
            .iter()
            .enumerate()
            .map(|(i, bytes)| (i, minhash_signature(bytes)))
            .collect();
        let rough_candidates = lsh_candidates(&signatures);
        let sig_by_idx: HashMap<usize, &Vec<u64>> =
            signatures.iter().map(|(i, s)| (*i, s)).collect();
        rough_candidates
            .into_iter()
            .filter(|&(a, b)| estimated_jaccard(sig_by_idx[&a], sig_by_idx[&b]) >= 0.5)
            .collect()
    } else {
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((i, j));
            }
        }
        pairs
    };

    let mut results: Vec<(usize, usize, f64)> = candidate_pairs
        .into_iter()
        .map(|(i, j)| (i, j, ncd(&corpus[i], &corpus[j])))
        .filter(|&(_, _, d)| d < CLONE_THRESHOLD)
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_content_has_near_zero_ncd() {
        let a = b"fn foo() { let x = 1; return x + 1; }".to_vec();
        let b = a.clone();
        assert!(ncd(&a, &b) < 0.05);
    }

    #[test]
    fn unrelated_content_exceeds_clone_threshold() {
        let a = b"fn foo() { let x = 1; return x + 1; }".repeat(10);
        let b = b"completely different payload with unrelated tokens and structure entirely".repeat(10);
        assert!(ncd(&a, &b) >= CLONE_THRESHOLD);
    }

    #[test]
    fn small_corpus_uses_exact_pairwise_ncd() {
        let corpus = vec![b"alpha beta gamma".to_vec(), b"alpha beta gamma".to_vec(), b"totally unrelated text here".to_vec()];
        let pairs = find_clone_pairs(&corpus);
        assert!(pairs.iter().any(|&(i, j, _)| i == 0 && j == 1));
    }
}
