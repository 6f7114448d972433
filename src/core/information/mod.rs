//! Information-theoretic kernels (spec 4.4): compression ratio, NCD with
//! MinHash/LSH pre-filtering, TF-IDF cosine coherence, tiered concept
//! extraction.

pub mod compression;
pub mod concepts;
pub mod gini;
pub mod ncd;
pub mod tfidf;

pub use compression::ratio as compression_ratio;
pub use concepts::{extract_concepts, ConceptSummary};
pub use gini::gini;
pub use ncd::{find_clone_pairs, ncd as normalized_compression_distance, CLONE_THRESHOLD};
pub use tfidf::{cosine_similarity, semantic_coherence, DocumentFrequencies, SparseVector};
