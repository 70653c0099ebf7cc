//! # Grouper Module
//!
//! Splits a photo session into items by the time between shots.
//!
//! ## How It Works
//! Photos of one item are taken in quick succession; moving on to the next
//! item leaves a longer pause. After sorting by capture time, a new group
//! starts whenever the gap to the previous photo exceeds the threshold.
//!
//! | Threshold | Effect |
//! |-----------|--------|
//! | 0s        | Every photo alone, unless taken in the same instant |
//! | 30-60s    | Typical for one item per handful of shots |
//! | 300s      | Long pauses only |
//!
//! When the number of items is roughly known, [`ThresholdSearch`] picks the
//! threshold whose group count comes closest.

mod stats;
mod threshold;

pub use stats::{GapSample, GroupingStats};
pub use threshold::{SearchConfig, ThresholdChoice, ThresholdSearch, DEFAULT_TARGET_GROUPS};

use crate::core::timestamp::TimestampedImage;
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Threshold used when neither a fixed value nor a target is given
pub const DEFAULT_THRESHOLD_SECS: u32 = 60;

/// Photos of one catalog item, in capture order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub images: Vec<TimestampedImage>,
}

impl Group {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.images.first().map(|i| i.timestamp)
    }

    /// Time between the first and last photo
    pub fn span(&self) -> TimeDelta {
        match (self.images.first(), self.images.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => TimeDelta::zero(),
        }
    }
}

/// Sort by capture time; equal times fall back to original name, then current name
pub fn sort_chronologically(images: &mut [TimestampedImage]) {
    images.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.original_name.cmp(&b.original_name))
            .then_with(|| a.file_name.cmp(&b.file_name))
    });
}

/// Groups photos by gaps longer than a threshold
#[derive(Debug, Clone, Copy)]
pub struct TimeGapGrouper {
    threshold: TimeDelta,
    threshold_secs: u32,
}

impl TimeGapGrouper {
    pub fn new(threshold_secs: u32) -> Self {
        Self {
            threshold: TimeDelta::seconds(i64::from(threshold_secs)),
            threshold_secs,
        }
    }

    pub fn threshold_secs(&self) -> u32 {
        self.threshold_secs
    }

    /// Whether `next` begins a new item after `previous`
    pub fn starts_new_group(&self, previous: &NaiveDateTime, next: &NaiveDateTime) -> bool {
        *next - *previous > self.threshold
    }

    /// Sort and group
    pub fn group(&self, mut images: Vec<TimestampedImage>) -> Vec<Group> {
        sort_chronologically(&mut images);
        self.group_sorted(images)
    }

    /// Group images that are already in chronological order
    pub fn group_sorted(&self, images: Vec<TimestampedImage>) -> Vec<Group> {
        let mut groups: Vec<Group> = Vec::new();
        let mut current: Vec<TimestampedImage> = Vec::new();

        for image in images {
            if let Some(previous) = current.last() {
                if self.starts_new_group(&previous.timestamp, &image.timestamp) {
                    groups.push(Group {
                        images: std::mem::take(&mut current),
                    });
                }
            }
            current.push(image);
        }

        if !current.is_empty() {
            groups.push(Group { images: current });
        }

        groups
    }

    /// Number of groups `group_sorted` would produce, without building them
    pub fn count_groups(&self, sorted: &[TimestampedImage]) -> usize {
        if sorted.is_empty() {
            return 0;
        }
        1 + sorted
            .windows(2)
            .filter(|pair| self.starts_new_group(&pair[0].timestamp, &pair[1].timestamp))
            .count()
    }
}
