//! Collection driver
//!
//! Owns the identity registry, metadata store and synchronizer for one
//! root folder and keeps them in step: a sync rescans the disk, registers
//! new files, retires removed ones and repoints records whose file moved
//! to another directory. Metadata is loaded lazily.
//!
//! Search, recommendation and galleries borrow the registry and store
//! through the accessors below; nothing is global.

use std::path::{Path, PathBuf};
use tracing::info;

use aimg_common::config::Settings;

use crate::error::{IndexError, IndexResult};
use crate::models::ImageId;
use crate::services::file_scanner::FileSynchronizer;
use crate::services::gallery::{Gallery, GalleryLoadReport};
use crate::services::metadata_store::{LoadOutcome, MetadataStore};
use crate::services::registry::{IdentityRegistry, RegistryError};
use crate::services::search::SearchEngine;
use crate::services::viewer::ImageViewer;

/// Changes applied by one [`Collection::sync`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Newly registered images
    pub added: Vec<ImageId>,
    /// Images retired because their file disappeared
    pub removed: Vec<ImageId>,
    /// Images whose file moved to another directory
    pub relocated: Vec<ImageId>,
    /// File names that could not be registered (identifier collision)
    pub collisions: Vec<String>,
}

/// One indexed image collection
#[derive(Debug)]
pub struct Collection {
    root: PathBuf,
    registry: IdentityRegistry,
    store: MetadataStore,
    scanner: FileSynchronizer,
}

impl Collection {
    /// Empty collection over `root`, scanning `.png` files
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            store: MetadataStore::new(root.clone()),
            registry: IdentityRegistry::new(),
            scanner: FileSynchronizer::new(),
            root,
        }
    }

    /// Empty collection configured from resolved settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_parts(
            IdentityRegistry::new(),
            MetadataStore::new(settings.root_folder.clone()),
            FileSynchronizer::with_extension(&settings.image_extension),
        )
    }

    /// Assemble from existing parts; the root is taken from the store
    pub fn from_parts(
        registry: IdentityRegistry,
        store: MetadataStore,
        scanner: FileSynchronizer,
    ) -> Self {
        Self {
            root: store.root().to_path_buf(),
            registry,
            store,
            scanner,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.store
    }

    pub fn metadata_mut(&mut self) -> &mut MetadataStore {
        &mut self.store
    }

    pub fn scanner(&self) -> &FileSynchronizer {
        &self.scanner
    }

    pub fn search(&self) -> SearchEngine<'_> {
        SearchEngine::new(&self.store)
    }

    pub fn viewer(&self) -> ImageViewer<'_> {
        ImageViewer::new(&self.store)
    }

    /// Rescan the root and reconcile the registry and store with it
    pub fn sync(&mut self) -> IndexResult<SyncReport> {
        self.scanner.rescan(&self.root)?;

        let mut report = SyncReport::default();

        for name in self.scanner.removed() {
            if let Some(id) = self.registry.lookup(&name) {
                self.registry.unregister(id);
                self.store.remove_entry(id);
                report.removed.push(id);
            }
        }

        for name in self.scanner.added() {
            if self.registry.lookup(&name).is_some() {
                continue;
            }

            match self.registry.register(&name) {
                Ok(id) => {
                    let location = self.location_of(&name);
                    self.store.add_entry(id, &location);
                    report.added.push(id);
                }
                Err(RegistryError::AlreadyRegistered { .. }) => {}
                Err(RegistryError::Collision { .. }) => report.collisions.push(name),
            }
        }

        // Names that stayed but moved between directories
        for name in self.scanner.files() {
            let Some(id) = self.registry.lookup(name) else {
                continue;
            };
            let location = self.location_of(name);
            if self.store.file_path(id) != Some(location.as_str()) {
                self.store.relocate_entry(id, &location);
                report.relocated.push(id);
            }
        }

        info!(
            root = %self.root.display(),
            added = report.added.len(),
            removed = report.removed.len(),
            relocated = report.relocated.len(),
            collisions = report.collisions.len(),
            total = self.registry.len(),
            "Collection synchronised"
        );

        Ok(report)
    }

    /// Root-relative location of a scanned file name, `/`-separated
    fn location_of(&self, name: &str) -> String {
        self.scanner
            .location(name)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|| name.to_string())
    }

    pub fn load_metadata(&mut self, id: ImageId) -> LoadOutcome {
        self.store.load_metadata(id)
    }

    /// Load metadata for every registered image; returns the failure count
    pub fn load_all_metadata(&mut self) -> usize {
        let ids: Vec<ImageId> = self.store.identifiers().collect();
        ids.into_iter()
            .filter(|&id| self.store.load_metadata(id) != LoadOutcome::Loaded)
            .count()
    }

    /// Resolve a user reference: identifier text, canonical path or file name
    pub fn resolve(&self, reference: &str) -> Option<ImageId> {
        let reference = reference.trim();

        if let Ok(id) = reference.parse::<ImageId>() {
            if self.registry.contains(id) {
                return Some(id);
            }
        }

        self.registry.lookup(reference).or_else(|| {
            let name = Path::new(reference).file_name()?.to_str()?;
            self.registry.lookup(name)
        })
    }

    /// Like [`Collection::resolve`], failing when nothing matches
    ///
    /// A reference that parses as an identifier fails with
    /// [`IndexError::UnknownIdentifier`]; anything else with
    /// [`IndexError::UnknownImage`].
    pub fn require(&self, reference: &str) -> IndexResult<ImageId> {
        if let Some(id) = self.resolve(reference) {
            return Ok(id);
        }

        match reference.trim().parse::<ImageId>() {
            Ok(id) => Err(IndexError::UnknownIdentifier(id)),
            Err(_) => Err(IndexError::UnknownImage(reference.to_string())),
        }
    }

    /// Load a gallery file against this collection
    pub fn load_gallery(&mut self, path: &Path) -> IndexResult<(Gallery, GalleryLoadReport)> {
        let mut gallery = Gallery::default();
        let report = gallery.load_file(path, &self.registry, &mut self.store)?;
        Ok((gallery, report))
    }

    /// Number of registered images
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
