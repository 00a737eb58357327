//! Tiny PNG fixtures with text chunks

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// One fixture image: path relative to the root plus its text chunks
pub struct TestImage {
    pub relative_path: &'static str,
    pub chunks: Vec<(&'static str, &'static str)>,
}

impl TestImage {
    pub fn new(relative_path: &'static str, chunks: &[(&'static str, &'static str)]) -> Self {
        Self {
            relative_path,
            chunks: chunks.to_vec(),
        }
    }
}

/// Write a 4x3 RGB PNG with the given text chunks
pub fn write_png(path: &Path, chunks: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }

    let file = File::create(path).unwrap();
    let mut encoder = png::Encoder::new(BufWriter::new(file), 4, 3);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    for (keyword, value) in chunks {
        encoder
            .add_text_chunk(keyword.to_string(), value.to_string())
            .unwrap();
    }
    let mut writer = encoder.write_header().unwrap();
    writer.write_image_data(&[0u8; 4 * 3 * 3]).unwrap();
}

/// Write every fixture under `root`; returns the absolute paths
pub fn generate_test_library(root: &Path, images: &[TestImage]) -> Vec<PathBuf> {
    images
        .iter()
        .map(|image| {
            let path = root.join(image.relative_path);
            write_png(&path, &image.chunks);
            path
        })
        .collect()
}
