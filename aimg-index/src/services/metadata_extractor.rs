//! Image metadata extraction service
//!
//! Reads generation metadata embedded in PNG files using the `png` crate.
//!
//! Extracts:
//! - tEXt, zTXt and iTXt text chunks (keyword -> text)
//! - Pixel width and height from IHDR
//!
//! Only chunks that precede the image data are read; generators write
//! their parameters there.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// File exists but could not be decoded as PNG
    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// I/O error (file open/read)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Text fields and dimensions pulled out of one image file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Text chunk keyword -> value, keys exactly as stored in the file
    pub text: HashMap<String, String>,

    /// Pixel (width, height), absent when unknown
    pub dimensions: Option<(u32, u32)>,
}

/// Anything that can produce [`ExtractedMetadata`] for an absolute path
pub trait MetadataSource {
    fn extract(&self, path: &Path) -> Result<ExtractedMetadata, MetadataError>;
}

/// Metadata extractor for PNG files
#[derive(Debug, Default, Clone, Copy)]
pub struct PngMetadataExtractor;

impl PngMetadataExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSource for PngMetadataExtractor {
    fn extract(&self, path: &Path) -> Result<ExtractedMetadata, MetadataError> {
        let file = File::open(path)?;
        let decode_err = |e: png::DecodingError| MetadataError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let decoder = png::Decoder::new(BufReader::new(file));
        let reader = decoder.read_info().map_err(decode_err)?;
        let info = reader.info();

        let mut text = HashMap::new();
        for chunk in &info.uncompressed_latin1_text {
            text.insert(chunk.keyword.clone(), chunk.text.clone());
        }
        for chunk in &info.compressed_latin1_text {
            match chunk.get_text() {
                Ok(value) => {
                    text.insert(chunk.keyword.clone(), value);
                }
                Err(e) => tracing::warn!(
                    file = %path.display(),
                    keyword = %chunk.keyword,
                    "Skipping unreadable zTXt chunk: {}",
                    e
                ),
            }
        }
        for chunk in &info.utf8_text {
            match chunk.get_text() {
                Ok(value) => {
                    text.insert(chunk.keyword.clone(), value);
                }
                Err(e) => tracing::warn!(
                    file = %path.display(),
                    keyword = %chunk.keyword,
                    "Skipping unreadable iTXt chunk: {}",
                    e
                ),
            }
        }

        let dimensions = Some((info.width, info.height));

        tracing::debug!(
            file = %path.display(),
            keys = text.len(),
            width = info.width,
            height = info.height,
            "Extracted metadata"
        );

        Ok(ExtractedMetadata { text, dimensions })
    }
}
