//! Curated collections (galleries)
//!
//! A gallery is a named, ordered list of identifiers stored on disk as:
//!
//! ```json
//! {
//!   "gallery_name": "Cyberpunk Cities",
//!   "description": "Collection of futuristic urban landscapes",
//!   "created_date": "2025-09-30",
//!   "images": ["generated_images/city_001.png", "generated_images/city_002.png"]
//! }
//! ```
//!
//! Each gallery owns its list; several galleries may hold the same
//! identifiers without affecting one another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

use aimg_common::{time, DisplayMode};

use crate::error::SourceFileError;
use crate::models::ImageId;
use crate::services::metadata_store::{LoadOutcome, MetadataStore};
use crate::services::registry::IdentityRegistry;
use crate::services::viewer::ImageViewer;

pub const DEFAULT_GALLERY_NAME: &str = "Unnamed Gallery";

#[derive(Debug, Serialize, Deserialize)]
struct GalleryFile {
    #[serde(default)]
    gallery_name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    created_date: Option<String>,
    #[serde(default)]
    images: Vec<String>,
}

/// Outcome of [`Gallery::load_file`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryLoadReport {
    /// Entries resolved to a registered image
    pub loaded: usize,
    /// Entries with no registered image, as written in the file
    pub skipped: Vec<String>,
}

/// Named, ordered subset of the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gallery {
    pub name: String,
    pub description: String,
    pub created_date: String,
    images: Vec<ImageId>,
}

impl Gallery {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            created_date: String::new(),
            images: Vec::new(),
        }
    }

    /// Gallery holding `ids` in order, duplicates dropped
    pub fn from_ids(name: &str, ids: impl IntoIterator<Item = ImageId>) -> Self {
        let mut gallery = Self::new(name);
        for id in ids {
            gallery.add_image_at_end(id);
        }
        gallery
    }

    /// Replace this gallery with the contents of a JSON file
    ///
    /// Entries are resolved by their root-relative path first and then by
    /// file name. Unresolved entries are skipped with a warning. Resolved
    /// images whose prompt is still absent get their metadata loaded.
    ///
    /// If the file is missing or malformed the image list is left empty
    /// and the error is returned.
    pub fn load_file(
        &mut self,
        path: &Path,
        registry: &IdentityRegistry,
        store: &mut MetadataStore,
    ) -> Result<GalleryLoadReport, SourceFileError> {
        self.images.clear();

        let content =
            std::fs::read_to_string(path).map_err(|e| SourceFileError::from_read(path, e))?;
        let file: GalleryFile =
            serde_json::from_str(&content).map_err(|e| SourceFileError::Malformed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        if let Some(name) = file.gallery_name {
            self.name = name;
        }
        self.description = file.description.unwrap_or_default();
        self.created_date = file.created_date.unwrap_or_default();
        if !self.created_date.is_empty() && time::parse_date(&self.created_date).is_none() {
            warn!(
                gallery = %self.name,
                created_date = %self.created_date,
                "Unrecognised creation date kept as written"
            );
        }

        let mut report = GalleryLoadReport::default();
        for entry in file.images {
            match resolve_entry(registry, &entry) {
                Some(id) => {
                    if store.prompt(id).is_none()
                        && store.load_metadata(id) == LoadOutcome::ReadFailed
                    {
                        warn!(
                            gallery = %self.name,
                            id = %id,
                            "Metadata unavailable for gallery image"
                        );
                    }
                    self.add_image_at_end(id);
                    report.loaded += 1;
                }
                None => {
                    warn!(gallery = %self.name, entry = %entry, "Image not registered, skipped");
                    report.skipped.push(entry);
                }
            }
        }

        debug!(
            gallery = %self.name,
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "Gallery loaded"
        );
        Ok(report)
    }

    /// Write this gallery in the JSON file format
    ///
    /// Images no longer bound in the registry are left out. An empty
    /// creation date is filled with today's date.
    pub fn save_file(
        &self,
        path: &Path,
        registry: &IdentityRegistry,
    ) -> Result<(), SourceFileError> {
        let images = self
            .images
            .iter()
            .filter_map(|&id| {
                let path = registry.path_of(id);
                if path.is_none() {
                    warn!(gallery = %self.name, id = %id, "Image no longer registered, not saved");
                }
                path.map(str::to_string)
            })
            .collect();

        let created_date = if self.created_date.is_empty() {
            time::today()
        } else {
            self.created_date.clone()
        };

        let file = GalleryFile {
            gallery_name: Some(self.name.clone()),
            description: Some(self.description.clone()),
            created_date: Some(created_date),
            images,
        };

        let json = serde_json::to_string_pretty(&file).map_err(|e| SourceFileError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| SourceFileError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Append `id` unless it is already in the gallery
    pub fn add_image_at_end(&mut self, id: ImageId) {
        if !self.images.contains(&id) {
            self.images.push(id);
        }
    }

    pub fn remove_first_image(&mut self) -> Option<ImageId> {
        if self.images.is_empty() {
            None
        } else {
            Some(self.images.remove(0))
        }
    }

    pub fn remove_last_image(&mut self) -> Option<ImageId> {
        self.images.pop()
    }

    pub fn images(&self) -> &[ImageId] {
        &self.images
    }

    pub fn iter(&self) -> impl Iterator<Item = ImageId> + '_ {
        self.images.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Display every image in order
    ///
    /// `after_open` runs each time an image was handed to the external
    /// viewer, so the caller can pause between images.
    pub fn show(
        &self,
        viewer: &ImageViewer<'_>,
        mode: DisplayMode,
        out: &mut dyn Write,
        after_open: &mut dyn FnMut() -> io::Result<()>,
    ) -> io::Result<()> {
        writeln!(out, "--- Gallery: {} ({} images) ---", self.name, self.len())?;

        if self.images.is_empty() {
            writeln!(out, "The gallery is empty.")?;
            return Ok(());
        }

        for (i, &id) in self.images.iter().enumerate() {
            writeln!(out, "[Image {}/{} of gallery '{}']", i + 1, self.len(), self.name)?;
            if viewer.show_image(id, mode, out)? {
                after_open()?;
            }
        }

        writeln!(out, "--- End of gallery: {} ---", self.name)
    }
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new(DEFAULT_GALLERY_NAME)
    }
}

impl fmt::Display for Gallery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gallery '{}' ({} images", self.name, self.len())?;
        if !self.description.is_empty() {
            write!(f, ", {}", self.description)?;
        }
        write!(f, ")")
    }
}

/// Resolve a gallery entry: full relative path first, then file name
fn resolve_entry(registry: &IdentityRegistry, entry: &str) -> Option<ImageId> {
    let normalized = entry.trim().replace('\\', "/");
    let normalized = normalized.trim_start_matches("./");

    registry.lookup(normalized).or_else(|| {
        let name = normalized.rsplit('/').next()?;
        registry.lookup(name)
    })
}
