//! aimg-index library interface
//!
//! Indexes a folder of generated images: stable identifiers, lazily loaded
//! PNG text metadata, substring search, embedding similarity and galleries.

pub mod collection;
pub mod error;
pub mod models;
pub mod services;

pub use crate::collection::{Collection, SyncReport};
pub use crate::error::{IndexError, IndexResult, SourceFileError};
pub use crate::models::{ImageId, MetadataField, MetadataRecord};
