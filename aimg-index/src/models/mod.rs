//! Data models for aimg-index
//!
//! - Image identifiers
//! - Metadata fields and per-image metadata records

pub mod image_id;
pub mod metadata;

pub use image_id::ImageId;
pub use metadata::{MetadataField, MetadataRecord};
