//! Regroup canonical files after manual edits to their names.
//!
//! Appending `x` or `y` to a photo number (`item-40-3x.jpg`) moves that
//! photo into a new item placed right after item 40. Renaming a file to
//! another item id moves it into that item.

use super::naming::CanonicalName;
use super::types::PhotoRef;
use crate::core::catalog::ProvenanceMapping;
use crate::core::scanner::ImageFile;
use std::collections::{BTreeMap, HashSet};

/// Position of a split marker: unmarked, then `x`, then `y`
fn split_rank(split: Option<char>) -> u8 {
    match split {
        None => 0,
        Some('x') => 1,
        Some(_) => 2,
    }
}

/// Groups canonical file names by item id and split marker
pub struct SuffixRegrouper<'a> {
    provenance: &'a ProvenanceMapping,
}

/// Regrouped photos plus the names that were left out
#[derive(Debug, Default)]
pub struct Regrouping {
    pub groups: Vec<Vec<PhotoRef>>,
    /// `item-*` names that do not follow the canonical form
    pub skipped: Vec<String>,
}

impl<'a> SuffixRegrouper<'a> {
    pub fn new(provenance: &'a ProvenanceMapping) -> Self {
        Self { provenance }
    }

    /// Original name of a file, looking through a hand-added split marker
    /// when the marked name itself has no entry.
    fn origin_of(&self, name: &CanonicalName, file_name: &str, present: &HashSet<&str>) -> String {
        if let Some(original) = self.provenance.original_for(file_name) {
            return original.to_string();
        }
        if name.split.is_some() {
            let unmarked = CanonicalName {
                split: None,
                ..name.clone()
            }
            .to_string();
            if !present.contains(unmarked.as_str()) {
                if let Some(original) = self.provenance.original_for(&unmarked) {
                    return original.to_string();
                }
            }
        }
        file_name.to_string()
    }

    /// Groups ordered by item id then split marker, photos by number then name.
    /// Files that are not `item-*` are ignored.
    pub fn regroup(&self, images: &[ImageFile]) -> Regrouping {
        let present: HashSet<&str> = images.iter().map(|i| i.file_name.as_str()).collect();
        let mut keyed: BTreeMap<(u32, u8), Vec<(u32, PhotoRef)>> = BTreeMap::new();
        let mut result = Regrouping::default();

        for image in images {
            match CanonicalName::parse(&image.file_name) {
                Some(name) => {
                    let photo = PhotoRef {
                        file_name: image.file_name.clone(),
                        extension: image.extension.clone(),
                        original_name: self.origin_of(&name, &image.file_name, &present),
                    };
                    keyed
                        .entry((name.item_id, split_rank(name.split)))
                        .or_default()
                        .push((name.photo_number, photo));
                }
                None if image.file_name.to_lowercase().starts_with("item-") => {
                    tracing::warn!("Skipping {}: not an item-N-M name", image.file_name);
                    result.skipped.push(image.file_name.clone());
                }
                None => tracing::debug!("Ignoring {}", image.file_name),
            }
        }

        result.groups = keyed
            .into_values()
            .map(|mut photos| {
                photos.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.file_name.cmp(&b.1.file_name)));
                photos.into_iter().map(|(_, photo)| photo).collect()
            })
            .collect();

        result
    }
}
