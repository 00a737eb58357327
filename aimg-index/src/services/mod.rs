//! Service modules for indexing and querying an image collection

pub mod embeddings;
pub mod file_scanner;
pub mod gallery;
pub mod metadata_extractor;
pub mod metadata_store;
pub mod recommender;
pub mod registry;
pub mod search;
pub mod viewer;

pub use embeddings::EmbeddingTable;
pub use file_scanner::{FileSynchronizer, ScanError};
pub use gallery::{Gallery, GalleryLoadReport};
pub use metadata_extractor::{
    ExtractedMetadata, MetadataError, MetadataSource, PngMetadataExtractor,
};
pub use metadata_store::{LoadOutcome, MetadataStore};
pub use recommender::{cosine_similarity, Recommender};
pub use registry::{IdSource, IdentityRegistry, PathDerivedIds, RandomIds, RegistryError};
pub use search::{Combine, SearchEngine, SearchField};
pub use viewer::{ImageOpener, ImageViewer, SystemOpener};
