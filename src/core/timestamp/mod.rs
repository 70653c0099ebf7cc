//! # Timestamp Module
//!
//! Resolves when each photo was taken.
//!
//! ## Strategy Chain
//! Strategies are tried in order and the first one that yields a time wins:
//! 1. `Filename` - `YYYY-MM-DD HH.MM.SS[_N].jpg`
//! 2. `Provenance` - the original name recorded in the mapping file, parsed as above
//! 3. `Exif` - `DateTimeOriginal`, `DateTimeDigitized`, `DateTime`
//! 4. `Filesystem` - creation time, else modification time
//!
//! All times are local wall-clock times without an offset, which is what
//! both camera file names and EXIF record.

mod filename;
mod filesystem;
mod metadata;

pub use filename::{format_timestamp_name, is_timestamp_name, parse_timestamp_name};
pub use filesystem::file_time;
pub use metadata::{parse_exif_datetime, read_capture_time, DEFAULT_CAPTURE_TAGS};

use crate::core::catalog::ProvenanceMapping;
use crate::core::scanner::ImageFile;
use crate::error::TimestampError;
use crate::events::{Event, EventSender, ResolveEvent, ResolveProgress};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A photo with its resolved capture time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampedImage {
    pub path: PathBuf,
    pub file_name: String,
    /// Lowercased extension without the dot
    pub extension: String,
    pub timestamp: NaiveDateTime,
    /// Which strategy produced the timestamp
    pub source: TimestampSource,
    /// First known name of the file (from the mapping), or its current name
    pub original_name: String,
}

/// Where a timestamp came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    Filename,
    Provenance,
    Exif,
    Filesystem,
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::Filename => write!(f, "filename"),
            TimestampSource::Provenance => write!(f, "mapping"),
            TimestampSource::Exif => write!(f, "EXIF"),
            TimestampSource::Filesystem => write!(f, "file system"),
        }
    }
}

/// One way of finding a timestamp
#[derive(Debug, Clone, PartialEq)]
pub enum ResolverStrategy {
    Filename,
    Provenance,
    Exif { tags: Vec<exif::Tag> },
    Filesystem,
}

impl ResolverStrategy {
    /// EXIF strategy with the default tag order
    pub fn exif() -> Self {
        ResolverStrategy::Exif {
            tags: DEFAULT_CAPTURE_TAGS.to_vec(),
        }
    }

    pub fn source(&self) -> TimestampSource {
        match self {
            ResolverStrategy::Filename => TimestampSource::Filename,
            ResolverStrategy::Provenance => TimestampSource::Provenance,
            ResolverStrategy::Exif { .. } => TimestampSource::Exif,
            ResolverStrategy::Filesystem => TimestampSource::Filesystem,
        }
    }
}

/// Result of resolving a batch of images
#[derive(Debug, Default)]
pub struct ResolveResult {
    /// Images with a timestamp, in input order
    pub images: Vec<TimestampedImage>,
    /// Images no strategy could date
    pub unresolved: Vec<PathBuf>,
}

/// Tries each strategy in turn for every image
#[derive(Debug, Clone)]
pub struct TimestampResolver {
    strategies: Vec<ResolverStrategy>,
    provenance: ProvenanceMapping,
}

impl TimestampResolver {
    /// Create a resolver with an explicit strategy order
    pub fn new(strategies: Vec<ResolverStrategy>) -> Self {
        Self {
            strategies,
            provenance: ProvenanceMapping::new(),
        }
    }

    /// Use a previous mapping for the `Provenance` strategy and for original names
    pub fn with_provenance(mut self, mapping: ProvenanceMapping) -> Self {
        self.provenance = mapping;
        self
    }

    pub fn strategies(&self) -> &[ResolverStrategy] {
        &self.strategies
    }

    /// Resolve one image
    pub fn resolve(&self, image: &ImageFile) -> Result<TimestampedImage, TimestampError> {
        for strategy in &self.strategies {
            if let Some(timestamp) = self.try_strategy(strategy, image) {
                return Ok(TimestampedImage {
                    path: image.path.clone(),
                    file_name: image.file_name.clone(),
                    extension: image.extension.clone(),
                    timestamp,
                    source: strategy.source(),
                    original_name: self.provenance.origin_of(&image.file_name).to_string(),
                });
            }
        }

        Err(TimestampError::Unresolvable {
            path: image.path.clone(),
        })
    }

    fn try_strategy(&self, strategy: &ResolverStrategy, image: &ImageFile) -> Option<NaiveDateTime> {
        match strategy {
            ResolverStrategy::Filename => parse_timestamp_name(&image.file_name),
            ResolverStrategy::Provenance => self
                .provenance
                .original_for(&image.file_name)
                .and_then(parse_timestamp_name),
            ResolverStrategy::Exif { tags } => match read_capture_time(&image.path, tags) {
                Ok(found) => found,
                Err(e) => {
                    tracing::debug!("{}, falling back", e);
                    None
                }
            },
            ResolverStrategy::Filesystem => file_time(&image.path),
        }
    }

    /// Resolve every image; failures are collected, never fatal
    pub fn resolve_all(&self, images: &[ImageFile], events: &EventSender) -> ResolveResult {
        let total = images.len();
        events.send(Event::Resolve(ResolveEvent::Started { total_images: total }));

        let mut result = ResolveResult::default();
        for (i, image) in images.iter().enumerate() {
            match self.resolve(image) {
                Ok(resolved) => result.images.push(resolved),
                Err(e) => {
                    tracing::warn!("{}", e);
                    events.send(Event::Resolve(ResolveEvent::Unresolved {
                        path: image.path.clone(),
                    }));
                    result.unresolved.push(image.path.clone());
                }
            }

            events.send(Event::Resolve(ResolveEvent::Progress(ResolveProgress {
                completed: i + 1,
                total,
                current_path: image.path.clone(),
            })));
        }

        events.send(Event::Resolve(ResolveEvent::Completed {
            resolved: result.images.len(),
            unresolved: result.unresolved.len(),
        }));

        result
    }
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new(vec![
            ResolverStrategy::Filename,
            ResolverStrategy::Provenance,
            ResolverStrategy::exif(),
            ResolverStrategy::Filesystem,
        ])
    }
}
