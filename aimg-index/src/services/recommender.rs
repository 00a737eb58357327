//! Similarity recommender
//!
//! Brute-force nearest-neighbour ranking by cosine similarity over the
//! precomputed embedding table.
//!
//! The recommender is unindexed until [`Recommender::preprocess`] runs;
//! before that every query returns nothing. Each `preprocess` call
//! rebuilds the index from scratch.

use std::collections::HashMap;
use tracing::{info, warn};

use crate::models::ImageId;
use crate::services::embeddings::EmbeddingTable;
use crate::services::registry::IdentityRegistry;

/// Cosine similarity of two vectors, in `[-1, 1]`
///
/// Uses f64 accumulation. Returns 0.0 for empty or zero-norm vectors, for
/// vectors of different length, and when any component is infinite or NaN.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;

    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if !(dot.is_finite() && norm_a.is_finite() && norm_b.is_finite()) {
        return 0.0;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Embedding-based image recommender
#[derive(Debug, Clone)]
pub struct Recommender {
    table: EmbeddingTable,
    extension: String,
    index: Option<Vec<(ImageId, Vec<f32>)>>,
    positions: HashMap<ImageId, usize>,
}

impl Recommender {
    /// Recommender over `table`, resolving stems as `<stem>.png`
    pub fn new(table: EmbeddingTable) -> Self {
        Self::with_extension(table, "png")
    }

    pub fn with_extension(table: EmbeddingTable, extension: &str) -> Self {
        Self {
            table,
            extension: extension.trim_start_matches('.').to_lowercase(),
            index: None,
            positions: HashMap::new(),
        }
    }

    /// Resolve every table stem through the registry and index its vector
    ///
    /// Stems without a registered file are skipped. Returns the number of
    /// vectors indexed.
    pub fn preprocess(&mut self, registry: &IdentityRegistry) -> usize {
        let mut index = Vec::new();
        let mut positions = HashMap::new();
        let mut skipped = 0usize;

        for (stem, vector) in self.table.iter() {
            let file_name = format!("{}.{}", stem, self.extension);
            match registry.lookup(&file_name) {
                Some(id) => {
                    positions.insert(id, index.len());
                    index.push((id, vector.to_vec()));
                }
                None => {
                    warn!(stem = %stem, "No registered image for embedding, skipped");
                    skipped += 1;
                }
            }
        }

        info!(indexed = index.len(), skipped, "Embedding index built");

        let indexed = index.len();
        self.index = Some(index);
        self.positions = positions;
        indexed
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Number of indexed vectors (0 while unindexed)
    pub fn len(&self) -> usize {
        self.index.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn vector(&self, id: ImageId) -> Option<&[f32]> {
        let index = self.index.as_ref()?;
        let &pos = self.positions.get(&id)?;
        Some(index[pos].1.as_slice())
    }

    /// Up to `k` identifiers most similar to `query`, best first
    pub fn find_similar(&self, query: ImageId, k: usize) -> Vec<ImageId> {
        self.find_similar_scored(query, k)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    /// Like [`Recommender::find_similar`], with similarity scores
    ///
    /// The query itself is never compared or returned. Ties keep index
    /// order (embedding table stem order).
    pub fn find_similar_scored(&self, query: ImageId, k: usize) -> Vec<(ImageId, f64)> {
        let (Some(index), Some(query_vec)) = (self.index.as_ref(), self.vector(query)) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        let mut results: Vec<(ImageId, f64)> = index
            .iter()
            .filter(|(id, _)| *id != query)
            .map(|(id, vec)| (*id, cosine_similarity(query_vec, vec)))
            .collect();

        results.sort_by(|a, b| b.1.total_cmp(&a.1));
        results.truncate(k);
        results
    }

    /// Prompts interpolating between two images
    ///
    /// Not implemented yet: always empty.
    pub fn find_transition_prompts(&self, _from: ImageId, _to: ImageId) -> Vec<String> {
        Vec::new()
    }
}
