//! Identity registry
//!
//! Bidirectional map between canonical paths and image identifiers. Both
//! directions are updated together, so the two maps always hold the same
//! number of entries and are mutual inverses.
//!
//! Registration is one-shot per path: registering a path that already has
//! an identifier fails with [`RegistryError::AlreadyRegistered`], and
//! callers wanting the existing binding use [`IdentityRegistry::lookup`].

use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::ImageId;
use aimg_common::uuid_utils;

/// Registry errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Path already has an identifier
    #[error("'{path}' is already registered as {id}")]
    AlreadyRegistered { path: String, id: ImageId },

    /// Generated identifier is already bound to another path
    #[error("Identifier {id} generated for '{path}' is already in use by '{existing_path}'")]
    Collision {
        path: String,
        id: ImageId,
        existing_path: String,
    },
}

/// Source of new identifiers
pub trait IdSource {
    /// Produce an identifier for a canonical path
    fn next_id(&mut self, canonical_path: &str) -> ImageId;
}

/// UUIDv5 over the canonical path
///
/// The same path always yields the same identifier, across runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathDerivedIds;

impl IdSource for PathDerivedIds {
    fn next_id(&mut self, canonical_path: &str) -> ImageId {
        ImageId::new(uuid_utils::from_path(canonical_path))
    }
}

/// Random UUIDv4 per registration
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdSource for RandomIds {
    fn next_id(&mut self, _canonical_path: &str) -> ImageId {
        ImageId::new(uuid_utils::generate())
    }
}

/// Canonical path <-> identifier registry
pub struct IdentityRegistry {
    path_to_id: HashMap<String, ImageId>,
    id_to_path: HashMap<ImageId, String>,
    source: Box<dyn IdSource>,
}

impl IdentityRegistry {
    /// Create a registry using path-derived identifiers
    pub fn new() -> Self {
        Self::with_source(Box::new(PathDerivedIds))
    }

    pub fn with_source(source: Box<dyn IdSource>) -> Self {
        Self {
            path_to_id: HashMap::new(),
            id_to_path: HashMap::new(),
            source,
        }
    }

    /// Bind a new identifier to `path`
    ///
    /// On error no state changes.
    pub fn register(&mut self, path: &str) -> Result<ImageId, RegistryError> {
        if let Some(&id) = self.path_to_id.get(path) {
            return Err(RegistryError::AlreadyRegistered {
                path: path.to_string(),
                id,
            });
        }

        let id = self.source.next_id(path);

        if let Some(existing_path) = self.id_to_path.get(&id) {
            warn!(
                path = %path,
                id = %id,
                existing = %existing_path,
                "Identifier collision, file ignored"
            );
            return Err(RegistryError::Collision {
                path: path.to_string(),
                id,
                existing_path: existing_path.clone(),
            });
        }

        self.path_to_id.insert(path.to_string(), id);
        self.id_to_path.insert(id, path.to_string());
        debug!(path = %path, id = %id, "Registered image");

        Ok(id)
    }

    pub fn lookup(&self, path: &str) -> Option<ImageId> {
        self.path_to_id.get(path).copied()
    }

    /// Reverse lookup: the canonical path bound to `id`
    pub fn path_of(&self, id: ImageId) -> Option<&str> {
        self.id_to_path.get(&id).map(String::as_str)
    }

    /// Remove both directions of the binding
    ///
    /// Unknown identifiers are a no-op. Returns the path that was bound.
    pub fn unregister(&mut self, id: ImageId) -> Option<String> {
        let path = self.id_to_path.remove(&id)?;
        self.path_to_id.remove(&path);
        debug!(path = %path, id = %id, "Unregistered image");
        Some(path)
    }

    pub fn contains(&self, id: ImageId) -> bool {
        self.id_to_path.contains_key(&id)
    }

    /// Number of active identifiers
    pub fn len(&self) -> usize {
        self.id_to_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_path.is_empty()
    }

    /// All (path, identifier) bindings, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ImageId)> {
        self.path_to_id.iter().map(|(p, id)| (p.as_str(), *id))
    }
}

impl Default for IdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentityRegistry ({} active identifiers)", self.len())
    }
}

impl fmt::Debug for IdentityRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("len", &self.len())
            .finish()
    }
}
