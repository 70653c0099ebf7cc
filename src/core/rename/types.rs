//! Types for the rename module.

use crate::core::catalog::ProvenanceMapping;
use crate::core::timestamp::TimestampedImage;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A photo as the planner needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRef {
    pub file_name: String,
    pub extension: String,
    /// First known name of the file
    pub original_name: String,
}

impl From<&TimestampedImage> for PhotoRef {
    fn from(image: &TimestampedImage) -> Self {
        Self {
            file_name: image.file_name.clone(),
            extension: image.extension.clone(),
            original_name: image.original_name.clone(),
        }
    }
}

/// One photo's place in the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedPhoto {
    pub photo_number: u32,
    pub source_name: String,
    pub target_name: String,
    pub original_name: String,
}

impl PlannedPhoto {
    /// Already named correctly
    pub fn is_unchanged(&self) -> bool {
        self.source_name == self.target_name
    }
}

/// One catalog item's photos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedItem {
    pub id: u32,
    pub photos: Vec<PlannedPhoto>,
}

/// The full set of renames for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenamePlan {
    pub items: Vec<PlannedItem>,
}

impl RenamePlan {
    pub fn total_photos(&self) -> usize {
        self.items.iter().map(|i| i.photos.len()).sum()
    }

    pub fn photos(&self) -> impl Iterator<Item = &PlannedPhoto> {
        self.items.iter().flat_map(|i| i.photos.iter())
    }

    /// Renames that actually move a file
    pub fn requests(&self) -> Vec<RenameRequest> {
        self.photos()
            .filter(|p| !p.is_unchanged())
            .map(|p| RenameRequest::new(&p.source_name, &p.target_name))
            .collect()
    }

    /// Mapping after the run, given each file's final name.
    ///
    /// Entries of `previous` for files this plan moves, or for originals it
    /// covers, are dropped; every photo whose final name differs from its
    /// original gets an entry.
    pub fn provenance<'a, F>(&'a self, previous: &ProvenanceMapping, final_name: F) -> ProvenanceMapping
    where
        F: Fn(&'a PlannedPhoto) -> &'a str,
    {
        let sources: HashSet<&str> = self.photos().map(|p| p.source_name.as_str()).collect();
        let originals: HashSet<&str> = self.photos().map(|p| p.original_name.as_str()).collect();

        let mut mapping = previous.clone();
        mapping.retain(|current, original| !sources.contains(current) && !originals.contains(original));
        for photo in self.photos() {
            let name = final_name(photo);
            if name != photo.original_name {
                mapping.insert(name, photo.original_name.clone());
            }
        }
        mapping
    }
}

/// Move `source_name` to `target_name` inside one directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenameRequest {
    pub source_name: String,
    pub target_name: String,
}

impl RenameRequest {
    pub fn new(source_name: &str, target_name: &str) -> Self {
        Self {
            source_name: source_name.to_string(),
            target_name: target_name.to_string(),
        }
    }
}

/// Requests sorted out before anything is touched
#[derive(Debug, Clone, Default)]
pub struct Preflight {
    /// Safe to attempt
    pub pending: Vec<RenameRequest>,
    /// Target exists and is not being moved away
    pub collisions: Vec<RenameRequest>,
    /// Source file is not there
    pub missing: Vec<RenameRequest>,
}

impl Preflight {
    /// Final name of `source_name` if only the preflight verdict is applied
    pub fn expected_name<'a>(&'a self, source_name: &'a str) -> &'a str {
        self.pending
            .iter()
            .find(|r| r.source_name == source_name)
            .map(|r| r.target_name.as_str())
            .unwrap_or(source_name)
    }
}

/// What happened to one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "message")]
pub enum RenameStatus {
    /// Dry run: would be renamed
    Planned,
    Renamed,
    /// Skipped to avoid overwriting an existing file
    Collision,
    /// Left under its source name after an error
    Failed(String),
}

/// Outcome of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameOutcome {
    pub source_name: String,
    pub target_name: String,
    /// Name the file has after the run
    pub final_name: String,
    pub status: RenameStatus,
}

/// One entry of the staging map: source, then staged, then target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedRename {
    pub source_name: String,
    pub staged_name: String,
    pub target_name: String,
}

/// Result of executing a set of renames
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenameReport {
    pub outcomes: Vec<RenameOutcome>,
    pub staged: Vec<StagedRename>,
    pub duration_ms: u64,
}

impl RenameReport {
    /// Report for a dry run, from the preflight verdicts alone
    pub fn preview(preflight: &Preflight) -> Self {
        let mut outcomes: Vec<RenameOutcome> = preflight
            .pending
            .iter()
            .map(|r| RenameOutcome {
                source_name: r.source_name.clone(),
                target_name: r.target_name.clone(),
                final_name: r.target_name.clone(),
                status: RenameStatus::Planned,
            })
            .collect();
        outcomes.extend(Self::skipped(preflight));
        Self {
            outcomes,
            staged: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Outcomes for requests the preflight ruled out
    pub(crate) fn skipped(preflight: &Preflight) -> Vec<RenameOutcome> {
        let collisions = preflight.collisions.iter().map(|r| RenameOutcome {
            source_name: r.source_name.clone(),
            target_name: r.target_name.clone(),
            final_name: r.source_name.clone(),
            status: RenameStatus::Collision,
        });
        let missing = preflight.missing.iter().map(|r| RenameOutcome {
            source_name: r.source_name.clone(),
            target_name: r.target_name.clone(),
            final_name: r.source_name.clone(),
            status: RenameStatus::Failed("source file not found".to_string()),
        });
        collisions.chain(missing).collect()
    }

    /// Final name per source name
    pub fn final_names(&self) -> HashMap<&str, &str> {
        self.outcomes
            .iter()
            .map(|o| (o.source_name.as_str(), o.final_name.as_str()))
            .collect()
    }

    pub fn renamed_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RenameStatus::Renamed | RenameStatus::Planned))
            .count()
    }

    pub fn collisions(&self) -> impl Iterator<Item = &RenameOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == RenameStatus::Collision)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RenameOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RenameStatus::Failed(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.renamed_count()
    }
}
