//! Catalog items for a rename plan.

use super::types::{PlannedPhoto, RenamePlan, RenameReport};
use crate::core::catalog::{Catalog, CatalogItem, ItemDefaults, LocalizedText, ProvenanceMapping};
use std::collections::HashMap;

/// Name of `photo` after the run: its outcome if it was attempted, else unchanged
pub fn final_name<'a>(photo: &'a PlannedPhoto, finals: &HashMap<&'a str, &'a str>) -> &'a str {
    finals
        .get(photo.source_name.as_str())
        .copied()
        .unwrap_or(photo.source_name.as_str())
}

/// One placeholder item per planned item, with image paths built from the
/// names the files actually ended up with.
pub fn build_catalog(plan: &RenamePlan, report: &RenameReport, defaults: &ItemDefaults) -> Catalog {
    let finals = report.final_names();

    let items = plan
        .items
        .iter()
        .map(|item| {
            let images = item
                .photos
                .iter()
                .map(|photo| defaults.image_url(final_name(photo, &finals)))
                .collect();
            CatalogItem::placeholder(item.id, images, defaults)
        })
        .collect();

    Catalog::with_items(items)
}

/// Original name of the first photo of an existing catalog item
fn first_origin<'a>(item: &'a CatalogItem, previous: &'a ProvenanceMapping) -> Option<&'a str> {
    let url = item.images.first()?;
    let file_name = url.rsplit('/').next()?;
    Some(previous.origin_of(file_name))
}

/// Carry hand edits from `existing` into a freshly built catalog.
///
/// An existing item follows its first photo: the new item whose first photo
/// has the same original name takes over every field except `id` and
/// `images`. Text still equal to the old placeholder is renumbered.
/// Returns the number of items carried over.
pub fn carry_over_edits(
    catalog: &mut Catalog,
    existing: Catalog,
    plan: &RenamePlan,
    previous: &ProvenanceMapping,
) -> usize {
    let mut by_origin: HashMap<String, CatalogItem> = HashMap::new();
    for item in existing.items {
        if let Some(origin) = first_origin(&item, previous).map(str::to_string) {
            by_origin.entry(origin).or_insert(item);
        }
    }

    let mut carried = 0;
    for (item, planned) in catalog.items.iter_mut().zip(&plan.items) {
        let Some(first) = planned.photos.first() else {
            continue;
        };
        let Some(mut edited) = by_origin.remove(first.original_name.as_str()) else {
            continue;
        };

        let old_photos = edited.images.len();
        if edited.en == LocalizedText::placeholder_en(edited.id, old_photos) {
            edited.en = item.en.clone();
        }
        if edited.sv == LocalizedText::placeholder_sv(edited.id, old_photos) {
            edited.sv = item.sv.clone();
        }
        edited.id = item.id;
        edited.images = std::mem::take(&mut item.images);
        *item = edited;
        carried += 1;
    }

    if !by_origin.is_empty() {
        let mut lost: Vec<u32> = by_origin.values().map(|item| item.id).collect();
        lost.sort_unstable();
        tracing::warn!("Items {:?} no longer match any photo group; their edits were not kept", lost);
    }

    catalog.extra = existing.extra;
    carried
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rename::types::{PlannedItem, RenameOutcome, RenameStatus};

    fn planned(n: u32, source: &str, target: &str) -> PlannedPhoto {
        PlannedPhoto {
            photo_number: n,
            source_name: source.to_string(),
            target_name: target.to_string(),
            original_name: source.to_string(),
        }
    }

    #[test]
    fn images_follow_actual_outcomes() {
        let plan = RenamePlan {
            items: vec![PlannedItem {
                id: 1,
                photos: vec![
                    planned(1, "item-1-1.jpg", "item-1-1.jpg"),
                    planned(2, "a.jpg", "item-1-2.jpg"),
                    planned(3, "b.jpg", "item-1-3.jpg"),
                ],
            }],
        };
        let report = RenameReport {
            outcomes: vec![
                RenameOutcome {
                    source_name: "a.jpg".to_string(),
                    target_name: "item-1-2.jpg".to_string(),
                    final_name: "item-1-2.jpg".to_string(),
                    status: RenameStatus::Renamed,
                },
                RenameOutcome {
                    source_name: "b.jpg".to_string(),
                    target_name: "item-1-3.jpg".to_string(),
                    final_name: "b.jpg".to_string(),
                    status: RenameStatus::Collision,
                },
            ],
            ..RenameReport::default()
        };

        let catalog = build_catalog(&plan, &report, &ItemDefaults::default());

        assert_eq!(
            catalog.items[0].images,
            vec![
                "/for-sale/images/item-1-1.jpg",
                "/for-sale/images/item-1-2.jpg",
                "/for-sale/images/b.jpg",
            ]
        );
        assert_eq!(catalog.items[0].en.description, "This is item 1 with 3 photos. In good condition.");
    }

    #[test]
    fn items_keep_plan_order_and_defaults() {
        let plan = RenamePlan {
            items: vec![
                PlannedItem { id: 1, photos: vec![planned(1, "a.jpg", "item-1-1.jpg")] },
                PlannedItem { id: 2, photos: vec![planned(1, "b.jpg", "item-2-1.jpg")] },
            ],
        };
        let defaults = ItemDefaults {
            categories: vec![3, 5],
            price: 250,
            image_url_prefix: "/img/".to_string(),
        };

        let catalog = build_catalog(&plan, &RenameReport::default(), &defaults);

        let ids: Vec<u32> = catalog.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(catalog.items[1].categories, vec![3, 5]);
        assert_eq!(catalog.items[1].price, 250);
        assert!(catalog.items.iter().all(|i| i.active));
        assert_eq!(catalog.items[1].images, vec!["/img/b.jpg"]);
    }

    #[test]
    fn edits_follow_the_first_photo() {
        let defaults = ItemDefaults::default();
        let mut previous = ProvenanceMapping::new();
        previous.insert("item-1-1.jpg", "12.00.00.jpg");
        previous.insert("item-1-2.jpg", "12.00.09.jpg");
        previous.insert("item-2-1.jpg", "12.05.00.jpg");

        let mut zelda = CatalogItem::placeholder(
            1,
            vec![defaults.image_url("item-1-1.jpg"), defaults.image_url("item-1-2.jpg")],
            &defaults,
        );
        zelda.en.title = "Zelda".to_string();
        zelda.price = 450;
        zelda.extra.insert("condition".to_string(), serde_json::Value::from(4));
        let untouched = CatalogItem::placeholder(2, vec![defaults.image_url("item-2-1.jpg")], &defaults);
        let mut existing = Catalog::with_items(vec![zelda, untouched]);
        existing.extra.insert("version".to_string(), serde_json::Value::from(2));

        // The second photo of item 1 was split off, so the old item 2 moves to 3
        let mut split = planned(1, "item-1-2x.jpg", "item-2-1.jpg");
        split.original_name = "12.00.09.jpg".to_string();
        let mut first = planned(1, "item-1-1.jpg", "item-1-1.jpg");
        first.original_name = "12.00.00.jpg".to_string();
        let mut moved = planned(1, "item-2-1.jpg", "item-3-1.jpg");
        moved.original_name = "12.05.00.jpg".to_string();
        let plan = RenamePlan {
            items: vec![
                PlannedItem { id: 1, photos: vec![first] },
                PlannedItem { id: 2, photos: vec![split] },
                PlannedItem { id: 3, photos: vec![moved] },
            ],
        };
        let mut catalog = build_catalog(&plan, &RenameReport::default(), &defaults);

        let carried = carry_over_edits(&mut catalog, existing, &plan, &previous);

        assert_eq!(carried, 2);
        let first = &catalog.items[0];
        assert_eq!(first.en.title, "Zelda");
        assert_eq!(first.price, 450);
        assert_eq!(first.extra.get("condition"), Some(&serde_json::Value::from(4)));
        assert_eq!(first.images, vec!["/for-sale/images/item-1-1.jpg"]);
        // Untouched placeholder text is renumbered
        assert_eq!(catalog.items[1].en.title, "Item 2");
        assert_eq!(catalog.items[2].id, 3);
        assert_eq!(catalog.items[2].en.title, "Item 3");
        assert_eq!(catalog.items[2].sv.title, "Artikel 3");
        assert_eq!(catalog.extra.get("version"), Some(&serde_json::Value::from(2)));
    }

    #[test]
    fn nothing_to_carry_into_a_new_catalog() {
        let plan = RenamePlan {
            items: vec![PlannedItem { id: 1, photos: vec![planned(1, "a.jpg", "item-1-1.jpg")] }],
        };
        let mut catalog = build_catalog(&plan, &RenameReport::default(), &ItemDefaults::default());
        let before = catalog.clone();

        let carried = carry_over_edits(&mut catalog, Catalog::default(), &plan, &ProvenanceMapping::new());

        assert_eq!(carried, 0);
        assert_eq!(catalog, before);
    }
}
