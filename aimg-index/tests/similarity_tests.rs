//! Embedding-based recommendation against a synchronised collection

mod helpers;

use aimg_index::services::{EmbeddingTable, Recommender};
use aimg_index::{Collection, SourceFileError};
use helpers::{generate_test_library, TestImage};

const EMBEDDINGS: &str = r#"{
  "vectors": {
    "cat":    { "image_embedding": [1.0, 0.0, 0.0] },
    "kitten": { "image_embedding": [0.9, 0.1, 0.0] },
    "dog":    { "image_embedding": [0.0, 1.0, 0.0] },
    "car":    { "image_embedding": [0.0, 0.0, 1.0] },
    "ghost":  { "image_embedding": [1.0, 0.0, 0.0] },
    "blank":  { "text_embedding": [1.0] }
  }
}"#;

fn setup(dir: &std::path::Path) -> (Collection, Recommender) {
    generate_test_library(
        dir,
        &[
            TestImage::new("cat.png", &[]),
            TestImage::new("pets/kitten.png", &[]),
            TestImage::new("dog.png", &[]),
            TestImage::new("car.png", &[]),
        ],
    );
    let path = dir.join("embeddings.json");
    std::fs::write(&path, EMBEDDINGS).unwrap();

    let mut collection = Collection::new(dir);
    collection.sync().unwrap();

    let table = EmbeddingTable::load(&path).unwrap();
    assert_eq!(table.len(), 5);
    let mut recommender = Recommender::new(table);
    assert_eq!(recommender.preprocess(collection.registry()), 4);
    (collection, recommender)
}

#[test]
fn test_nearest_neighbours() {
    let dir = tempfile::tempdir().unwrap();
    let (collection, recommender) = setup(dir.path());

    let cat = collection.resolve("cat.png").unwrap();
    let kitten = collection.resolve("kitten.png").unwrap();

    let similar = recommender.find_similar(cat, 2);
    assert_eq!(similar.len(), 2);
    assert_eq!(similar[0], kitten);
    assert!(!similar.contains(&cat));
}

#[test]
fn test_results_bounded_and_descending() {
    let dir = tempfile::tempdir().unwrap();
    let (collection, recommender) = setup(dir.path());
    let dog = collection.resolve("dog.png").unwrap();

    let scored = recommender.find_similar_scored(dog, 10);
    assert_eq!(scored.len(), 3);
    assert!(scored.windows(2).all(|w| w[0].1 >= w[1].1));
    assert!(scored.iter().all(|(id, _)| *id != dog));
}

#[test]
fn test_removed_image_drops_out_after_reindex() {
    let dir = tempfile::tempdir().unwrap();
    let (mut collection, mut recommender) = setup(dir.path());
    let cat = collection.resolve("cat.png").unwrap();
    let kitten = collection.resolve("kitten.png").unwrap();

    std::fs::remove_file(dir.path().join("pets/kitten.png")).unwrap();
    collection.sync().unwrap();
    assert_eq!(recommender.preprocess(collection.registry()), 3);

    assert!(!recommender.find_similar(cat, 3).contains(&kitten));
}

#[test]
fn test_missing_embedding_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EmbeddingTable::load(&dir.path().join("embeddings.json"));
    assert!(matches!(result, Err(SourceFileError::NotFound(_))));
}
