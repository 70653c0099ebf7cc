//! Summary numbers for a grouping, shown after each run.

use super::{Group, TimeGapGrouper};
use serde::{Deserialize, Serialize};

/// How many leading gaps are sampled
const SAMPLE_GAPS: usize = 10;

/// One gap between consecutive photos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapSample {
    pub seconds: f64,
    pub starts_new_item: bool,
}

/// Group size statistics plus a sample of gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupingStats {
    pub threshold_secs: u32,
    pub group_count: usize,
    pub image_count: usize,
    pub min_size: usize,
    pub max_size: usize,
    pub average_size: f64,
    pub sample_gaps: Vec<GapSample>,
}

impl GroupingStats {
    pub fn from_groups(groups: &[Group], threshold_secs: u32) -> Self {
        let sizes: Vec<usize> = groups.iter().map(Group::len).collect();
        let image_count: usize = sizes.iter().sum();
        let grouper = TimeGapGrouper::new(threshold_secs);

        let timestamps: Vec<_> = groups
            .iter()
            .flat_map(|g| g.images.iter().map(|i| i.timestamp))
            .take(SAMPLE_GAPS + 1)
            .collect();
        let sample_gaps = timestamps
            .windows(2)
            .map(|pair| GapSample {
                seconds: (pair[1] - pair[0]).num_milliseconds() as f64 / 1000.0,
                starts_new_item: grouper.starts_new_group(&pair[0], &pair[1]),
            })
            .collect();

        Self {
            threshold_secs,
            group_count: groups.len(),
            image_count,
            min_size: sizes.iter().copied().min().unwrap_or(0),
            max_size: sizes.iter().copied().max().unwrap_or(0),
            average_size: if groups.is_empty() {
                0.0
            } else {
                image_count as f64 / groups.len() as f64
            },
            sample_gaps,
        }
    }
}
