//! Metadata store
//!
//! One [`MetadataRecord`] per identifier, created blank by
//! [`MetadataStore::add_entry`] and populated lazily by
//! [`MetadataStore::load_metadata`].
//!
//! # Load failure policy
//!
//! When the backing file cannot be read, the record is cleared: every
//! field and both dimensions become absent. The failure is logged as a
//! warning and reported through [`LoadOutcome::ReadFailed`]; it is never
//! returned as an error. A successful load replaces the whole field set
//! in one step, so a record never mixes values from two reads.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::{ImageId, MetadataField, MetadataRecord};
use crate::services::metadata_extractor::{MetadataSource, PngMetadataExtractor};

/// Result of a [`MetadataStore::load_metadata`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Record refreshed from the file
    Loaded,
    /// File could not be read; record cleared
    ReadFailed,
    /// No record exists for the identifier; nothing happened
    UnknownIdentifier,
}

/// Per-image generation metadata keyed by identifier
pub struct MetadataStore {
    root: PathBuf,
    records: HashMap<ImageId, MetadataRecord>,
    source: Box<dyn MetadataSource>,
}

impl MetadataStore {
    /// Store rooted at `root`, reading PNG files
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_source(root, Box::new(PngMetadataExtractor::new()))
    }

    pub fn with_source(root: impl Into<PathBuf>, source: Box<dyn MetadataSource>) -> Self {
        Self {
            root: root.into(),
            records: HashMap::new(),
            source,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (or reset) a blank record for `id` backed by root-relative `path`
    pub fn add_entry(&mut self, id: ImageId, path: &str) {
        if self.records.insert(id, MetadataRecord::new(path)).is_some() {
            debug!(id = %id, path = %path, "Re-initialised existing metadata record");
        }
    }

    /// Change the backing file of an existing record
    ///
    /// Metadata fields and dimensions are kept: the file was moved, not
    /// rewritten. Returns false (and does nothing) for unknown identifiers.
    pub fn relocate_entry(&mut self, id: ImageId, path: &str) -> bool {
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        if record.file_path() != path {
            debug!(id = %id, from = %record.file_path(), to = %path, "Relocated metadata record");
            record.set_file_path(path);
        }
        true
    }

    /// Delete the record; missing records are ignored
    pub fn remove_entry(&mut self, id: ImageId) {
        self.records.remove(&id);
    }

    /// Re-read the backing file and replace the record's metadata
    pub fn load_metadata(&mut self, id: ImageId) -> LoadOutcome {
        let Some(record) = self.records.get_mut(&id) else {
            warn!(id = %id, "Load requested for unknown identifier");
            return LoadOutcome::UnknownIdentifier;
        };

        let full_path = self.root.join(record.file_path());

        match self.source.extract(&full_path) {
            Ok(extracted) => {
                record.replace(&extracted.text, extracted.dimensions);
                LoadOutcome::Loaded
            }
            Err(e) => {
                warn!(
                    id = %id,
                    file = %full_path.display(),
                    "Could not read metadata, record cleared: {}",
                    e
                );
                record.clear();
                LoadOutcome::ReadFailed
            }
        }
    }

    /// Field lookup by internal name (`prompt`, `cfg_scale`, ...)
    ///
    /// Unknown identifiers and unknown field names both yield `None`.
    pub fn get_field(&self, id: ImageId, field_name: &str) -> Option<&str> {
        let field = field_name.parse::<MetadataField>().ok()?;
        self.field(id, field)
    }

    pub fn field(&self, id: ImageId, field: MetadataField) -> Option<&str> {
        self.records.get(&id)?.get(field)
    }

    pub fn prompt(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Prompt)
    }

    pub fn model(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Model)
    }

    pub fn seed(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Seed)
    }

    pub fn cfg_scale(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::CfgScale)
    }

    pub fn steps(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Steps)
    }

    pub fn sampler(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Sampler)
    }

    pub fn generated(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::Generated)
    }

    pub fn created_date(&self, id: ImageId) -> Option<&str> {
        self.field(id, MetadataField::CreatedDate)
    }

    /// Root-relative path stored for `id`
    pub fn file_path(&self, id: ImageId) -> Option<&str> {
        self.records.get(&id).map(MetadataRecord::file_path)
    }

    /// (width, height), or (None, None) when unknown
    pub fn dimensions(&self, id: ImageId) -> (Option<u32>, Option<u32>) {
        self.records
            .get(&id)
            .map(MetadataRecord::dimensions)
            .unwrap_or((None, None))
    }

    pub fn record(&self, id: ImageId) -> Option<&MetadataRecord> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.records.contains_key(&id)
    }

    pub fn all_identifiers(&self) -> HashSet<ImageId> {
        self.records.keys().copied().collect()
    }

    pub fn identifiers(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.records.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Display for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MetadataStore ({} images registered)", self.len())
    }
}

impl fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataStore")
            .field("root", &self.root)
            .field("len", &self.len())
            .finish()
    }
}
