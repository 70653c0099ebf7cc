//! Two-phase rename inside one directory.
//!
//! Phase 1 moves every source to a unique hidden staging name, phase 2 moves
//! each staged file to its target. Swaps and chains (`item-2-1` becoming
//! `item-1-2` while `item-1-2` becomes `item-2-1`) never see an occupied
//! target, and an existing file that is not part of the plan is never
//! overwritten.

use super::naming::staging_name;
use super::types::*;
use crate::error::RenameError;
use crate::events::{Event, EventSender, RenameEvent, RenameProgress};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Executes renames inside a single directory
pub struct RenameExecutor {
    dir: PathBuf,
}

impl RenameExecutor {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Sort requests into safe, colliding and missing before touching anything.
    ///
    /// A target is free if nothing is there or the file there is itself being
    /// moved away. Skipping one request can occupy another's target, so the
    /// check repeats until nothing changes.
    pub fn preflight(&self, requests: &[RenameRequest]) -> Preflight {
        let mut preflight = Preflight::default();
        let mut candidates = Vec::new();

        for request in requests {
            if self.path_of(&request.source_name).is_file() {
                candidates.push(request.clone());
            } else {
                tracing::warn!(
                    "{}",
                    RenameError::SourceMissing {
                        path: self.path_of(&request.source_name)
                    }
                );
                preflight.missing.push(request.clone());
            }
        }

        loop {
            let moving: HashSet<&str> = candidates.iter().map(|r| r.source_name.as_str()).collect();
            let (blocked, free): (Vec<RenameRequest>, Vec<RenameRequest>) =
                candidates.iter().cloned().partition(|r| {
                    self.path_of(&r.target_name).exists() && !moving.contains(r.target_name.as_str())
                });

            if blocked.is_empty() {
                preflight.pending = free;
                break;
            }
            for request in &blocked {
                tracing::warn!(
                    "{}",
                    RenameError::Collision {
                        source_name: request.source_name.clone(),
                        target: self.path_of(&request.target_name),
                    }
                );
            }
            preflight.collisions.extend(blocked);
            candidates = free;
        }

        preflight
    }

    /// Run the renames that passed preflight
    pub fn execute(&self, preflight: &Preflight, events: &EventSender) -> RenameReport {
        let start = Instant::now();
        let total = preflight.pending.len();
        events.send(Event::Rename(RenameEvent::Started { total }));

        let mut outcomes = RenameReport::skipped(preflight);
        for outcome in &outcomes {
            Self::announce(outcome, events);
        }

        // Phase 1: source -> staging
        let mut staged = Vec::with_capacity(total);
        for request in &preflight.pending {
            let extension = Path::new(&request.target_name)
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            let staged_name = staging_name(extension);

            match self.move_file(&request.source_name, &staged_name) {
                Ok(()) => staged.push(StagedRename {
                    source_name: request.source_name.clone(),
                    staged_name,
                    target_name: request.target_name.clone(),
                }),
                Err(e) => {
                    tracing::error!("{}", e);
                    let outcome = RenameOutcome {
                        source_name: request.source_name.clone(),
                        target_name: request.target_name.clone(),
                        final_name: request.source_name.clone(),
                        status: RenameStatus::Failed(e.to_string()),
                    };
                    Self::announce(&outcome, events);
                    outcomes.push(outcome);
                }
            }
        }

        // Phase 2: staging -> target
        for (i, entry) in staged.iter().enumerate() {
            let outcome = if self.path_of(&entry.target_name).exists() {
                let e = RenameError::Collision {
                    source_name: entry.source_name.clone(),
                    target: self.path_of(&entry.target_name),
                };
                tracing::warn!("{}", e);
                self.roll_back(entry, RenameStatus::Collision)
            } else {
                match self.move_file(&entry.staged_name, &entry.target_name) {
                    Ok(()) => RenameOutcome {
                        source_name: entry.source_name.clone(),
                        target_name: entry.target_name.clone(),
                        final_name: entry.target_name.clone(),
                        status: RenameStatus::Renamed,
                    },
                    Err(e) => {
                        tracing::error!("{}", e);
                        self.roll_back(entry, RenameStatus::Failed(e.to_string()))
                    }
                }
            };

            Self::announce(&outcome, events);
            events.send(Event::Rename(RenameEvent::Progress(RenameProgress {
                completed: i + 1,
                total,
                current_name: entry.target_name.clone(),
            })));
            outcomes.push(outcome);
        }

        let report = RenameReport {
            outcomes,
            staged,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        events.send(Event::Rename(RenameEvent::Completed {
            renamed: report.renamed_count(),
            skipped: report.skipped_count(),
        }));

        report
    }

    /// Preflight and execute in one go
    pub fn rename_all(&self, requests: &[RenameRequest], events: &EventSender) -> RenameReport {
        let preflight = self.preflight(requests);
        self.execute(&preflight, events)
    }

    /// Put a staged file back under its source name
    fn roll_back(&self, entry: &StagedRename, status: RenameStatus) -> RenameOutcome {
        let final_name = if self.path_of(&entry.source_name).exists() {
            tracing::error!(
                "Cannot restore {}: {} is now taken, file left as {}",
                entry.staged_name,
                entry.source_name,
                entry.staged_name
            );
            entry.staged_name.clone()
        } else {
            match self.move_file(&entry.staged_name, &entry.source_name) {
                Ok(()) => entry.source_name.clone(),
                Err(e) => {
                    tracing::error!("{}, file left as {}", e, entry.staged_name);
                    entry.staged_name.clone()
                }
            }
        };

        RenameOutcome {
            source_name: entry.source_name.clone(),
            target_name: entry.target_name.clone(),
            final_name,
            status,
        }
    }

    fn move_file(&self, from: &str, to: &str) -> Result<(), RenameError> {
        let from = self.path_of(from);
        let to = self.path_of(to);
        fs::rename(&from, &to).map_err(|source| RenameError::Io { from, to, source })
    }

    fn announce(outcome: &RenameOutcome, events: &EventSender) {
        match &outcome.status {
            RenameStatus::Collision => events.send(Event::Rename(RenameEvent::Collision {
                source_name: outcome.source_name.clone(),
                target_name: outcome.target_name.clone(),
            })),
            RenameStatus::Failed(message) => events.send(Event::Rename(RenameEvent::Failed {
                source_name: outcome.source_name.clone(),
                message: message.clone(),
            })),
            RenameStatus::Planned | RenameStatus::Renamed => {}
        }
    }
}
