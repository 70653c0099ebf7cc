//! Search for the threshold that yields a target number of groups.
//!
//! Group count never increases as the threshold grows, so bisection over the
//! integer range homes in on the boundary. Real gaps are irregular, so the
//! search keeps the best probe it has seen instead of trusting where the
//! bisection stops.

use super::TimeGapGrouper;
use crate::core::timestamp::TimestampedImage;
use crate::error::GrouperError;
use crate::events::{null_sender, Event, EventSender, GroupEvent};
use serde::{Deserialize, Serialize};

/// Item count aimed for when none is given
pub const DEFAULT_TARGET_GROUPS: usize = 70;

/// Bounds for the threshold search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Smallest threshold considered, in seconds
    pub min_threshold_secs: u32,
    /// Largest threshold considered, in seconds
    pub max_threshold_secs: u32,
    /// Maximum number of bisection probes
    pub max_iterations: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_threshold_secs: 10,
            max_threshold_secs: 300,
            max_iterations: 20,
        }
    }
}

/// Outcome of a threshold search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdChoice {
    pub threshold_secs: u32,
    pub group_count: usize,
    pub target: usize,
    /// `|group_count - target|`
    pub distance: usize,
    /// Every `(threshold, group count)` probed, in order
    pub probes: Vec<(u32, usize)>,
}

impl ThresholdChoice {
    pub fn is_exact(&self) -> bool {
        self.distance == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Probe {
    threshold_secs: u32,
    group_count: usize,
    distance: usize,
}

/// Bisection search over `[min_threshold_secs, max_threshold_secs]`
#[derive(Debug, Clone)]
pub struct ThresholdSearch {
    config: SearchConfig,
}

impl ThresholdSearch {
    pub fn new(config: SearchConfig) -> Result<Self, GrouperError> {
        if config.min_threshold_secs > config.max_threshold_secs {
            return Err(GrouperError::Config(format!(
                "minimum threshold {}s is above maximum {}s",
                config.min_threshold_secs, config.max_threshold_secs
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Find the threshold whose group count is closest to `target`
    pub fn find(&self, sorted: &[TimestampedImage], target: usize) -> ThresholdChoice {
        self.find_with_events(sorted, target, &null_sender())
    }

    pub fn find_with_events(
        &self,
        sorted: &[TimestampedImage],
        target: usize,
        events: &EventSender,
    ) -> ThresholdChoice {
        let mut probes = Vec::new();
        let mut probe = |threshold_secs: u32| {
            let group_count = TimeGapGrouper::new(threshold_secs).count_groups(sorted);
            probes.push((threshold_secs, group_count));
            events.send(Event::Group(GroupEvent::ThresholdProbe {
                threshold_secs,
                group_count,
            }));
            tracing::debug!(threshold_secs, group_count, "threshold probe");
            Probe {
                threshold_secs,
                group_count,
                distance: group_count.abs_diff(target),
            }
        };

        let mut low = i64::from(self.config.min_threshold_secs);
        let mut high = i64::from(self.config.max_threshold_secs);
        let mut best: Option<Probe> = None;

        for _ in 0..self.config.max_iterations {
            if low > high {
                break;
            }
            let mid = low + (high - low) / 2;
            let current = probe(mid as u32);

            // Ties go to the smaller count, i.e. fewer, larger items
            let better = best.map_or(true, |b| {
                (current.distance, current.group_count) < (b.distance, b.group_count)
            });
            if better {
                best = Some(current);
            }

            if current.group_count > target {
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }

        let best = match best {
            Some(b) => b,
            None => probe(self.config.min_threshold_secs),
        };

        let threshold_secs = self.snap_to_smallest(sorted, best);

        ThresholdChoice {
            threshold_secs,
            group_count: best.group_count,
            target,
            distance: best.distance,
            probes,
        }
    }

    /// Smallest threshold in range giving the same count as `best`.
    ///
    /// Keeps the answer independent of where the bisection happened to probe.
    /// Falls back to `best` if the counts are not monotonic enough to agree.
    fn snap_to_smallest(&self, sorted: &[TimestampedImage], best: Probe) -> u32 {
        let count_at = |t: u32| TimeGapGrouper::new(t).count_groups(sorted);

        let mut low = self.config.min_threshold_secs;
        let mut high = best.threshold_secs;
        while low < high {
            let mid = low + (high - low) / 2;
            if count_at(mid) <= best.group_count {
                high = mid;
            } else {
                low = mid + 1;
            }
        }

        if count_at(low) == best.group_count {
            low
        } else {
            best.threshold_secs
        }
    }
}

impl Default for ThresholdSearch {
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grouper::test_support::images_at;

    /// Shots with gaps of 15, 25, 45, 80, 130 and 220 seconds between bursts
    fn session() -> Vec<TimestampedImage> {
        let mut offsets = Vec::new();
        let mut t = 0;
        for gap in [15, 25, 45, 80, 130, 220] {
            offsets.extend([t, t + 2, t + 4]);
            t += 4 + gap;
        }
        offsets.extend([t, t + 2]);
        images_at(&offsets)
    }

    #[test]
    fn finds_exact_count_when_reachable() {
        let images = session();
        let choice = ThresholdSearch::default().find(&images, 4);

        assert!(choice.is_exact());
        assert_eq!(TimeGapGrouper::new(choice.threshold_secs).count_groups(&images), 4);
    }

    #[test]
    fn returns_smallest_threshold_for_the_count() {
        let images = session();
        let choice = ThresholdSearch::default().find(&images, 4);

        // Gaps above 45s split; 45s is the smallest threshold that merges the 45s gap
        assert_eq!(choice.threshold_secs, 45);
    }

    #[test]
    fn larger_targets_never_raise_the_threshold() {
        let images = session();
        let search = ThresholdSearch::default();

        let thresholds: Vec<u32> = (1..=10).map(|t| search.find(&images, t).threshold_secs).collect();

        for pair in thresholds.windows(2) {
            assert!(pair[1] <= pair[0], "thresholds not monotonic: {:?}", thresholds);
        }
    }

    #[test]
    fn unreachable_target_returns_closest() {
        let images = session();
        // Even the smallest threshold (10s) merges the bursts into 7 groups
        let choice = ThresholdSearch::default().find(&images, 50);

        assert_eq!(choice.group_count, 7);
        assert_eq!(choice.distance, 43);
        assert_eq!(choice.threshold_secs, 10);
    }

    #[test]
    fn probes_are_bounded() {
        let images = session();
        let search = ThresholdSearch::new(SearchConfig {
            max_iterations: 3,
            ..SearchConfig::default()
        })
        .unwrap();

        let choice = search.find(&images, 4);

        assert_eq!(choice.probes.len(), 3);
    }

    #[test]
    fn empty_input_still_yields_a_threshold() {
        let choice = ThresholdSearch::default().find(&[], 10);
        assert_eq!(choice.group_count, 0);
        assert_eq!(choice.threshold_secs, 10);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let result = ThresholdSearch::new(SearchConfig {
            min_threshold_secs: 300,
            max_threshold_secs: 10,
            max_iterations: 20,
        });
        assert!(matches!(result, Err(GrouperError::Config(_))));
    }
}
