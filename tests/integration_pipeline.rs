//! Integration tests for the pipeline module.
//!
//! These tests run the whole workflow on a temporary image directory:
//! - Grouping, renaming and catalog output
//! - Re-runs on already renamed files
//! - Collisions, dry runs and fatal write failures
//! - Regrouping from split markers

use catalog_grouper::core::catalog::{CatalogStore, ProvenanceMapping};
use catalog_grouper::core::pipeline::Pipeline;
use catalog_grouper::core::timestamp::ResolverStrategy;
use catalog_grouper::error::{CatalogError, GrouperError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_photo(dir: &Path, name: &str) {
    fs::write(dir.join(name), format!("photo {}", name)).unwrap();
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".jpg"))
        .collect();
    names.sort();
    names
}

/// Photos shot one minute apart, 12:00:00 to 12:04:00
fn five_spaced_photos(dir: &Path) {
    for minute in 0..5 {
        write_photo(dir, &format!("2025-10-29 12.0{}.00.jpg", minute));
    }
}

/// Three bursts: 3 photos, 2 photos, 4 photos, separated by several minutes
fn three_bursts(dir: &Path) {
    for name in [
        "2025-10-29 12.00.00.jpg",
        "2025-10-29 12.00.05.jpg",
        "2025-10-29 12.00.09.jpg",
        "2025-10-29 12.05.00.jpg",
        "2025-10-29 12.05.04.jpg",
        "2025-10-29 12.11.00.jpg",
        "2025-10-29 12.11.02.jpg",
        "2025-10-29 12.11.02_1.jpg",
        "2025-10-29 12.11.07.jpg",
    ] {
        write_photo(dir, name);
    }
}

#[test]
fn spaced_photos_become_single_photo_items() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    five_spaced_photos(images.path());

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .threshold(30)
        .build()
        .unwrap();

    let result = pipeline.run().unwrap();

    assert_eq!(result.analysis.groups.len(), 5);
    assert_eq!(
        listing(images.path()),
        vec!["item-1-1.jpg", "item-2-1.jpg", "item-3-1.jpg", "item-4-1.jpg", "item-5-1.jpg"]
    );
    assert_eq!(
        fs::read_to_string(images.path().join("item-3-1.jpg")).unwrap(),
        "photo 2025-10-29 12.02.00.jpg"
    );

    let catalog = CatalogStore::new(data.path().join("items.json")).load().unwrap();
    assert_eq!(catalog.items.len(), 5);
    let ids: Vec<u32> = catalog.items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(catalog.items[4].images, vec!["/for-sale/images/item-5-1.jpg"]);
    assert_eq!(catalog.items[0].en.title, "Item 1");
    assert_eq!(catalog.items[0].sv.title, "Artikel 1");

    let mapping = ProvenanceMapping::load(&data.path().join("image-mapping.json")).unwrap();
    assert_eq!(mapping.len(), 5);
    assert_eq!(mapping.original_for("item-1-1.jpg"), Some("2025-10-29 12.00.00.jpg"));
}

#[test]
fn target_search_finds_the_bursts() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    three_bursts(images.path());

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .target_groups(3)
        .build()
        .unwrap();

    let result = pipeline.run().unwrap();

    let choice = result.analysis.choice.as_ref().unwrap();
    assert!(choice.is_exact());
    let sizes: Vec<usize> = result.applied.catalog.items.iter().map(|i| i.images.len()).collect();
    assert_eq!(sizes, vec![3, 2, 4]);
    // Equal timestamps keep their filename order
    assert_eq!(
        fs::read_to_string(images.path().join("item-3-2.jpg")).unwrap(),
        "photo 2025-10-29 12.11.02.jpg"
    );
    assert_eq!(
        fs::read_to_string(images.path().join("item-3-3.jpg")).unwrap(),
        "photo 2025-10-29 12.11.02_1.jpg"
    );
}

#[test]
fn second_run_changes_nothing() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    three_bursts(images.path());

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .target_groups(3)
        .build()
        .unwrap();

    let first = pipeline.run().unwrap();
    let names_after_first = listing(images.path());
    let mapping_after_first = ProvenanceMapping::load(&data.path().join("image-mapping.json")).unwrap();

    let second = pipeline.run().unwrap();

    assert_eq!(second.applied.report.renamed_count(), 0);
    assert_eq!(listing(images.path()), names_after_first);
    assert_eq!(
        ProvenanceMapping::load(&data.path().join("image-mapping.json")).unwrap(),
        mapping_after_first
    );
    assert_eq!(first.applied.catalog, second.applied.catalog);
    assert_eq!(first.analysis.threshold_secs, second.analysis.threshold_secs);
}

#[test]
fn dry_run_leaves_everything_in_place() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    five_spaced_photos(images.path());
    let before = listing(images.path());

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .threshold(30)
        .dry_run(true)
        .build()
        .unwrap();

    let result = pipeline.run().unwrap();

    assert!(result.applied.dry_run);
    assert_eq!(result.applied.report.renamed_count(), 5);
    assert_eq!(result.applied.catalog.items.len(), 5);
    assert_eq!(listing(images.path()), before);
    assert!(!data.path().join("items.json").exists());
    assert!(!data.path().join("image-mapping.json").exists());
}

#[test]
fn existing_file_is_never_overwritten() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    write_photo(images.path(), "2025-10-29 12.00.00.jpg");
    write_photo(images.path(), "2025-10-29 12.00.10.jpg");
    // Not datable from its name, so it stays out of the plan but blocks item-1-1
    fs::write(images.path().join("item-1-1.jpg"), "unrelated").unwrap();

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .strategies(vec![ResolverStrategy::Filename])
        .threshold(60)
        .build()
        .unwrap();

    let result = pipeline.run().unwrap();

    assert_eq!(result.analysis.unresolved.len(), 1);
    assert_eq!(result.applied.report.collisions().count(), 1);
    assert_eq!(
        fs::read_to_string(images.path().join("item-1-1.jpg")).unwrap(),
        "unrelated"
    );
    assert!(images.path().join("2025-10-29 12.00.00.jpg").is_file());
    assert!(images.path().join("item-1-2.jpg").is_file());

    let catalog = CatalogStore::new(data.path().join("items.json")).load().unwrap();
    assert_eq!(
        catalog.items[0].images,
        vec![
            "/for-sale/images/2025-10-29 12.00.00.jpg",
            "/for-sale/images/item-1-2.jpg",
        ]
    );
}

#[test]
fn catalog_write_failure_is_fatal_after_mapping_is_saved() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    five_spaced_photos(images.path());

    // The catalog's parent directory is a regular file
    let blocker = data.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();
    let mapping_path = data.path().join("image-mapping.json");

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(blocker.join("items.json"))
        .mapping(&mapping_path)
        .threshold(30)
        .build()
        .unwrap();

    let result = pipeline.run();

    assert!(matches!(
        result,
        Err(GrouperError::Catalog(CatalogError::Write { .. }))
    ));
    // The renames happened and the mapping can undo them
    let mapping = ProvenanceMapping::load(&mapping_path).unwrap();
    assert_eq!(mapping.len(), 5);
    assert!(images.path().join("item-5-1.jpg").is_file());
}

#[test]
fn mapping_write_failure_aborts_before_renaming() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    five_spaced_photos(images.path());
    let before = listing(images.path());

    let blocker = data.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .mapping(blocker.join("image-mapping.json"))
        .threshold(30)
        .build()
        .unwrap();

    assert!(pipeline.run().is_err());
    assert_eq!(listing(images.path()), before);
}

#[test]
fn regroup_moves_split_photos_into_new_items() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    three_bursts(images.path());

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(data.path().join("items.json"))
        .target_groups(3)
        .build()
        .unwrap();
    pipeline.run().unwrap();

    // Mark the last photo of item 1 as a separate item
    fs::rename(
        images.path().join("item-1-3.jpg"),
        images.path().join("item-1-3x.jpg"),
    )
    .unwrap();

    let result = pipeline.regroup_with_events(&catalog_grouper::events::null_sender()).unwrap();

    let sizes: Vec<usize> = result.applied.catalog.items.iter().map(|i| i.images.len()).collect();
    assert_eq!(sizes, vec![2, 1, 2, 4]);
    assert_eq!(
        fs::read_to_string(images.path().join("item-2-1.jpg")).unwrap(),
        "photo 2025-10-29 12.00.09.jpg"
    );

    // The mapping still points at the first names
    let mapping = ProvenanceMapping::load(&data.path().join("image-mapping.json")).unwrap();
    assert_eq!(mapping.original_for("item-2-1.jpg"), Some("2025-10-29 12.00.09.jpg"));
    assert_eq!(mapping.original_for("item-4-4.jpg"), Some("2025-10-29 12.11.07.jpg"));
    assert_eq!(mapping.original_for("item-1-3x.jpg"), None);
    assert_eq!(mapping.original_for("item-1-3.jpg"), None);
}

#[test]
fn rerun_keeps_hand_edited_items() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    three_bursts(images.path());
    let store = CatalogStore::new(data.path().join("items.json"));

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(store.path())
        .target_groups(3)
        .build()
        .unwrap();
    pipeline.run().unwrap();

    let mut catalog = store.load().unwrap();
    catalog.items[0].en.title = "Zelda".to_string();
    catalog.items[0].price = 450;
    catalog.items[0]
        .extra
        .insert("condition".to_string(), serde_json::Value::from(4));
    store.save(&catalog).unwrap();

    let second = pipeline.run().unwrap();

    assert_eq!(second.applied.report.renamed_count(), 0);
    let reloaded = store.load().unwrap();
    assert_eq!(reloaded, catalog);
    assert_eq!(reloaded.items[0].en.title, "Zelda");
    assert_eq!(reloaded.items[0].price, 450);
    assert_eq!(reloaded.items[0].extra.get("condition"), Some(&serde_json::Value::from(4)));
    assert_eq!(reloaded.items[1].en.title, "Item 2");
}

#[test]
fn malformed_catalog_aborts_before_renaming() {
    let images = TempDir::new().unwrap();
    let data = TempDir::new().unwrap();
    five_spaced_photos(images.path());
    let before = listing(images.path());
    let catalog_path = data.path().join("items.json");
    let broken = "{ \"items\": [ {\"id\": 1, oops ";
    fs::write(&catalog_path, broken).unwrap();

    let pipeline = Pipeline::builder()
        .image_dir(images.path())
        .catalog(&catalog_path)
        .threshold(30)
        .build()
        .unwrap();

    let result = pipeline.run();

    assert!(matches!(
        result,
        Err(GrouperError::Catalog(CatalogError::Parse { .. }))
    ));
    assert_eq!(listing(images.path()), before);
    assert_eq!(fs::read_to_string(&catalog_path).unwrap(), broken);
    assert!(!data.path().join("image-mapping.json").exists());
}
