//! Precomputed embedding table
//!
//! JSON layout:
//!
//! ```json
//! { "vectors": { "city_001": { "image_embedding": [0.1, 0.2, ...] } } }
//! ```
//!
//! Keys are file name stems (no extension). Entries without an
//! `image_embedding` array are skipped.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::error::SourceFileError;

#[derive(Debug, Deserialize)]
struct EmbeddingFile {
    vectors: BTreeMap<String, EmbeddingEntry>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingEntry {
    #[serde(default)]
    image_embedding: Option<Vec<f32>>,
}

/// Read-only stem -> vector table, iterated in stem order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingTable {
    vectors: BTreeMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the table from a JSON file
    pub fn load(path: &Path) -> Result<Self, SourceFileError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SourceFileError::from_read(path, e))?;
        let table = Self::from_json_str(&content).map_err(|reason| SourceFileError::Malformed {
            path: path.to_path_buf(),
            reason,
        })?;
        debug!(file = %path.display(), vectors = table.len(), "Loaded embedding table");
        Ok(table)
    }

    /// Parse the table from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let file: EmbeddingFile = serde_json::from_str(content).map_err(|e| e.to_string())?;

        let vectors = file
            .vectors
            .into_iter()
            .filter_map(|(stem, entry)| match entry.image_embedding {
                Some(vector) => Some((stem, vector)),
                None => {
                    debug!(stem = %stem, "Embedding entry has no image_embedding, skipped");
                    None
                }
            })
            .collect();

        Ok(Self { vectors })
    }

    pub fn insert(&mut self, stem: &str, vector: Vec<f32>) {
        self.vectors.insert(stem.to_string(), vector);
    }

    pub fn get(&self, stem: &str) -> Option<&[f32]> {
        self.vectors.get(stem).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.vectors.iter().map(|(s, v)| (s.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FromIterator<(String, Vec<f32>)> for EmbeddingTable {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f32>)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}
