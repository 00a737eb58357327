//! Metadata search over a synchronised collection

mod helpers;

use std::collections::HashSet;

use aimg_index::services::{Combine, SearchEngine, SearchField};
use aimg_index::{Collection, ImageId};
use helpers::{generate_test_library, TestImage};

fn indexed_collection(dir: &std::path::Path) -> Collection {
    generate_test_library(
        dir,
        &[
            TestImage::new(
                "city.png",
                &[
                    ("Prompt", "cyberpunk city"),
                    ("Model", "SDXL 1.0"),
                    ("Seed", "42"),
                    ("Steps", "30"),
                    ("Created_Date", "2025-09-30"),
                ],
            ),
            TestImage::new(
                "forest.png",
                &[
                    ("Prompt", "forest path"),
                    ("Model", "SD 1.5"),
                    ("Seed", "4242"),
                    ("Steps", "20"),
                    ("Created_Date", "2025-10-01"),
                ],
            ),
            TestImage::new("bare.png", &[]),
        ],
    );

    let mut collection = Collection::new(dir);
    collection.sync().unwrap();
    assert_eq!(collection.load_all_metadata(), 0);
    collection
}

fn ids(collection: &Collection, names: &[&str]) -> HashSet<ImageId> {
    names.iter().map(|n| collection.resolve(n).unwrap()).collect()
}

#[test]
fn test_prompt_substring() {
    let dir = tempfile::tempdir().unwrap();
    let collection = indexed_collection(dir.path());
    let search = collection.search();

    assert_eq!(search.prompt("cyber"), ids(&collection, &["city.png"]));
    assert!(search.prompt("Cyber").is_empty());
    assert_eq!(search.prompt(""), ids(&collection, &["city.png", "forest.png"]));
}

#[test]
fn test_field_queries() {
    let dir = tempfile::tempdir().unwrap();
    let collection = indexed_collection(dir.path());
    let search = collection.search();

    assert_eq!(search.seed("42"), ids(&collection, &["city.png", "forest.png"]));
    assert_eq!(search.steps("2"), ids(&collection, &["forest.png"]));
    assert_eq!(search.model("SDXL"), ids(&collection, &["city.png"]));
    assert_eq!(search.date("2025-10"), ids(&collection, &["forest.png"]));
    assert!(search.sampler("").is_empty());
    assert!(search.cfg_scale("7").is_empty());
}

#[test]
fn test_combinators() {
    let dir = tempfile::tempdir().unwrap();
    let collection = indexed_collection(dir.path());
    let search = collection.search();

    let seeds = search.seed("42");
    let sdxl = search.model("SDXL");

    assert_eq!(SearchEngine::and(&seeds, &sdxl), ids(&collection, &["city.png"]));
    assert_eq!(SearchEngine::or(&sdxl, &HashSet::new()), sdxl);
    assert_eq!(SearchEngine::and(&seeds, &seeds), seeds);
    assert_eq!(seeds.len(), 2);
}

#[test]
fn test_query_all() {
    let dir = tempfile::tempdir().unwrap();
    let collection = indexed_collection(dir.path());
    let search = collection.search();

    let criteria = vec![
        (SearchField::Prompt, "forest".to_string()),
        (SearchField::Model, "SDXL".to_string()),
    ];
    assert!(search.query_all(&criteria, Combine::All).is_empty());
    assert_eq!(
        search.query_all(&criteria, Combine::Any),
        ids(&collection, &["city.png", "forest.png"])
    );
    assert_eq!(search.query_all(&[], Combine::All).len(), 3);
}

#[test]
fn test_unloaded_records_never_match() {
    let dir = tempfile::tempdir().unwrap();
    generate_test_library(
        dir.path(),
        &[TestImage::new("city.png", &[("Prompt", "cyberpunk city")])],
    );

    let mut collection = Collection::new(dir.path());
    collection.sync().unwrap();
    assert!(collection.search().prompt("").is_empty());

    let id = collection.resolve("city.png").unwrap();
    collection.load_metadata(id);
    assert_eq!(collection.search().prompt("city").len(), 1);
}
