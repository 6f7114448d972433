//! TF-IDF vectors and semantic coherence (spec 4.4). Two-pass: pass one
//! accumulates document frequencies across the corpus, pass two emits
//! per-document vectors; coherence is the mean pairwise cosine similarity
//! over a file's function-level vectors.

use std::collections::HashMap;

pub type SparseVector = HashMap<String, f64>;

pub struct DocumentFrequencies {
    df: HashMap<String, usize>,
    corpus_size: usize,
}

impl DocumentFrequencies {
    /// Pass one: `documents` is tokenized per-document token sets.
    pub fn build(documents: &[Vec<String>]) -> Self {
        let mut df: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: std::collections::HashSet<&String> = doc.iter().collect();
            for token in unique {
                *df.entry(token.clone()).or_insert(0) += 1;
            }
        }
        Self {
            df,
            corpus_size: documents.len(),
        }
    }

    fn idf(&self, token: &str) -> f64 {
        let n = self.corpus_size.max(1) as f64;
        let df = *self.df.get(token).unwrap_or(&0) as f64;
        ((n + 1.0) / (df + 1.0)).ln() + 1.0
    }

    /// Pass two: emits a TF-IDF vector for one document's token list.
    pub fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut tf: HashMap<String, f64> = HashMap::new();
        for token in tokens {
            *tf.entry(token.clone()).or_insert(0.0) += 1.0;
        }
        let total = tokens.len().max(1) as f64;
        tf.into_iter()
            .map(|(token, count)| {
                let weight = (count / total) * self.idf(&token);
                (token, weight)
            })
            .collect()
    }
}

pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = smaller
        .iter()
        .filter_map(|(k, v)| larger.get(k).map(|w| v * w))
        .sum();
    let norm_a = (a.values().map(|v| v * v).sum::<f64>()).sqrt();
    let norm_b = (b.values().map(|v| v * v).sum::<f64>()).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// `semantic_coherence(f) = mean_{i<j} cos(v_i, v_j)` over a file's
/// function-level vectors. A file with 0 or 1 functions has no pairwise
/// comparison to make; coherence is undefined there and callers should
/// treat it as unavailable rather than 0.
pub fn semantic_coherence(function_vectors: &[SparseVector]) -> Option<f64> {
    let n = function_vectors.len();
    if n < 2 {
        return None;
    }
    let mut total = 0.0;
    let mut count = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            total += cosine_similarity(&function_vectors[i], &function_vectors[j]);
            count += 1;
        }
    }
    Some(total / count as f64)
}
