//! Turns ordered groups of photos into canonical names.

use super::naming::CanonicalName;
use super::types::*;

/// Builds rename plans
pub struct RenamePlanner;

/// Running counters while walking the groups
struct Numbering {
    next_item_id: u32,
}

impl Numbering {
    fn new() -> Self {
        Self { next_item_id: 1 }
    }

    fn next_item(&mut self) -> u32 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }
}

impl RenamePlanner {
    /// Plan one item per non-empty group, ids from 1 in group order,
    /// photo numbers from 1 in the order given within each group.
    pub fn plan<I>(groups: I) -> RenamePlan
    where
        I: IntoIterator<Item = Vec<PhotoRef>>,
    {
        let mut numbering = Numbering::new();
        let mut items = Vec::new();

        for group in groups {
            if group.is_empty() {
                continue;
            }
            let id = numbering.next_item();

            let photos = group
                .into_iter()
                .zip(1u32..)
                .map(|(photo, photo_number)| PlannedPhoto {
                    photo_number,
                    target_name: CanonicalName::new(id, photo_number, &photo.extension).to_string(),
                    source_name: photo.file_name,
                    original_name: photo.original_name,
                })
                .collect();

            items.push(PlannedItem { id, photos });
        }

        RenamePlan { items }
    }
}
