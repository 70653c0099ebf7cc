//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted while building a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Directory listing events
    Scan(ScanEvent),
    /// Timestamp resolution events
    Resolve(ResolveEvent),
    /// Grouping and threshold search events
    Group(GroupEvent),
    /// Rename events
    Rename(RenameEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events while listing the image directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    Started { path: PathBuf },
    ImageFound { path: PathBuf },
    Completed { total_images: usize },
}

/// Events while resolving timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    Started { total_images: usize },
    Progress(ResolveProgress),
    /// No strategy produced a timestamp; the image is left out of grouping
    Unresolved { path: PathBuf },
    Completed { resolved: usize, unresolved: usize },
}

/// Progress information during timestamp resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveProgress {
    pub completed: usize,
    pub total: usize,
    pub current_path: PathBuf,
}

/// Events while grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GroupEvent {
    /// One probe of the threshold search
    ThresholdProbe { threshold_secs: u32, group_count: usize },
    /// Threshold used for the final grouping
    ThresholdChosen { threshold_secs: u32, group_count: usize },
    Completed { total_groups: usize },
}

/// Events while renaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RenameEvent {
    Started { total: usize },
    Progress(RenameProgress),
    Collision { source_name: String, target_name: String },
    Failed { source_name: String, message: String },
    Completed { renamed: usize, skipped: usize },
}

/// Progress information during renaming
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameProgress {
    pub completed: usize,
    pub total: usize,
    pub current_name: String,
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    Started,
    PhaseChanged { phase: PipelinePhase },
    Completed { summary: PipelineSummary },
}

/// Pipeline phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Resolving,
    Grouping,
    Renaming,
    WritingCatalog,
}

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    pub total_images: usize,
    pub unresolved_images: usize,
    pub threshold_secs: u32,
    pub total_items: usize,
    pub renamed: usize,
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Resolving => write!(f, "Reading timestamps"),
            PipelinePhase::Grouping => write!(f, "Grouping"),
            PipelinePhase::Renaming => write!(f, "Renaming"),
            PipelinePhase::WritingCatalog => write!(f, "Writing catalog"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_serializable() {
        let event = Event::Group(GroupEvent::ThresholdProbe {
            threshold_secs: 155,
            group_count: 64,
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: Event = serde_json::from_str(&json).unwrap();

        match deserialized {
            Event::Group(GroupEvent::ThresholdProbe {
                threshold_secs,
                group_count,
            }) => {
                assert_eq!(threshold_secs, 155);
                assert_eq!(group_count, 64);
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn phase_display_is_readable() {
        assert_eq!(PipelinePhase::Resolving.to_string(), "Reading timestamps");
        assert_eq!(PipelinePhase::WritingCatalog.to_string(), "Writing catalog");
    }
}
