//! Rebuild the catalog from the canonical files on disk.

use super::store::CatalogStore;
use super::types::{Catalog, CatalogItem, ItemDefaults};
use crate::core::rename::CanonicalName;
use crate::core::scanner::{DirectoryScanner, ImageScanner, ScanConfig};
use crate::error::Result;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// What a sync changed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    /// Items in the catalog afterwards
    pub total: usize,
    /// Existing items kept (with or without new images)
    pub kept: usize,
    /// Placeholder items created for new ids
    pub added: usize,
    /// Kept items whose image list changed
    pub images_updated: usize,
    /// Ids removed because no file carries them
    pub dropped: Vec<u32>,
}

/// Canonical files per item id, photos in number order
fn files_by_item(dir: &Path, scan_config: ScanConfig) -> Result<BTreeMap<u32, Vec<String>>> {
    let scan = DirectoryScanner::new(scan_config).scan(dir)?;

    let mut by_item: BTreeMap<u32, Vec<(u32, String)>> = BTreeMap::new();
    for image in scan.images {
        match CanonicalName::parse(&image.file_name) {
            Some(name) if name.split.is_none() => by_item
                .entry(name.item_id)
                .or_default()
                .push((name.photo_number, image.file_name)),
            Some(_) => tracing::warn!("{} has a split marker; run regroup first", image.file_name),
            None => tracing::debug!("Ignoring {}", image.file_name),
        }
    }

    Ok(by_item
        .into_iter()
        .map(|(id, mut photos)| {
            photos.sort();
            (id, photos.into_iter().map(|(_, name)| name).collect())
        })
        .collect())
}

/// Make the catalog match the files: existing items keep every field
/// except `images`, new ids get placeholders, ids without files are dropped.
pub fn sync_catalog(
    dir: &Path,
    store: &CatalogStore,
    defaults: &ItemDefaults,
    scan_config: ScanConfig,
) -> Result<SyncReport> {
    let files = files_by_item(dir, scan_config)?;
    let existing = store.load_or_default()?;
    let (catalog, report) = merge(existing, &files, defaults);

    store.save(&catalog)?;
    tracing::info!(
        total = report.total,
        added = report.added,
        dropped = report.dropped.len(),
        "catalog synced"
    );
    Ok(report)
}

fn merge(existing: Catalog, files: &BTreeMap<u32, Vec<String>>, defaults: &ItemDefaults) -> (Catalog, SyncReport) {
    let mut report = SyncReport::default();
    let mut by_id: HashMap<u32, CatalogItem> = HashMap::new();

    for item in existing.items {
        if files.contains_key(&item.id) {
            by_id.insert(item.id, item);
        } else {
            report.dropped.push(item.id);
        }
    }
    report.dropped.sort_unstable();

    let items: Vec<CatalogItem> = files
        .iter()
        .map(|(&id, names)| {
            let images: Vec<String> = names.iter().map(|n| defaults.image_url(n)).collect();
            match by_id.remove(&id) {
                Some(mut item) => {
                    report.kept += 1;
                    if item.images != images {
                        report.images_updated += 1;
                        item.images = images;
                    }
                    item
                }
                None => {
                    report.added += 1;
                    CatalogItem::placeholder(id, images, defaults)
                }
            }
        })
        .collect();

    report.total = items.len();
    (
        Catalog {
            items,
            extra: existing.extra,
        },
        report,
    )
}
