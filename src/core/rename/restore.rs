//! Undo renames: back to the names in the mapping file, or to names built
//! from each photo's EXIF capture time.

use super::executor::RenameExecutor;
use super::types::{RenameReport, RenameRequest, RenameStatus};
use crate::core::catalog::ProvenanceMapping;
use crate::core::scanner::{DirectoryScanner, ImageScanner, ScanConfig};
use crate::core::timestamp::{format_timestamp_name, is_timestamp_name, read_capture_time, DEFAULT_CAPTURE_TAGS};
use crate::error::Result;
use crate::events::EventSender;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Result of restoring from the mapping file
#[derive(Debug, Clone, Default, Serialize)]
pub struct MappingRestoreReport {
    pub rename: RenameReport,
    /// Entries whose file already had its original name
    pub already_restored: Vec<String>,
    /// Entries naming a file that is in neither place
    pub missing: Vec<String>,
    /// Entries left in the mapping afterwards
    pub remaining_entries: usize,
}

/// Rename every mapped file back to its original name and drop the
/// restored entries from the mapping file.
pub fn restore_from_mapping(dir: &Path, mapping_path: &Path, events: &EventSender) -> Result<MappingRestoreReport> {
    let mut mapping = ProvenanceMapping::load(mapping_path)?;
    let mut report = MappingRestoreReport::default();
    let mut requests = Vec::new();

    for (current, original) in mapping.iter() {
        if dir.join(current).is_file() {
            requests.push(RenameRequest::new(current, original));
        } else if dir.join(original).is_file() {
            report.already_restored.push(current.to_string());
        } else {
            tracing::warn!("Mapped file {} not found in {}", current, dir.display());
            report.missing.push(current.to_string());
        }
    }

    report.rename = RenameExecutor::new(dir).rename_all(&requests, events);

    for name in &report.already_restored {
        mapping.remove(name);
    }
    for outcome in &report.rename.outcomes {
        if outcome.status == RenameStatus::Renamed {
            mapping.remove(&outcome.source_name);
        }
    }
    mapping.save(mapping_path)?;
    report.remaining_entries = mapping.len();

    tracing::info!(
        restored = report.rename.renamed_count(),
        remaining = report.remaining_entries,
        "restored from mapping"
    );
    Ok(report)
}

/// Result of restoring from EXIF capture times
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExifRestoreReport {
    pub rename: RenameReport,
    /// Files already named after their capture time
    pub unchanged: usize,
    /// Files with no readable capture time
    pub failed: Vec<String>,
}

/// Rename files not in timestamp form to `YYYY-MM-DD HH.MM.SS[_N].ext`
/// from their EXIF capture time.
pub fn restore_from_exif(dir: &Path, scan_config: ScanConfig, events: &EventSender) -> Result<ExifRestoreReport> {
    let scan = DirectoryScanner::new(scan_config).scan(dir)?;
    let mut report = ExifRestoreReport::default();

    let mut taken: HashSet<String> = HashSet::new();
    let mut dated = Vec::new();
    for image in &scan.images {
        if is_timestamp_name(&image.file_name) {
            report.unchanged += 1;
            taken.insert(image.file_name.to_lowercase());
            continue;
        }
        match read_capture_time(&image.path, DEFAULT_CAPTURE_TAGS) {
            Ok(Some(timestamp)) => dated.push((timestamp, image)),
            Ok(None) => {
                tracing::warn!("No capture time in {}", image.path.display());
                report.failed.push(image.file_name.clone());
            }
            Err(e) => {
                tracing::warn!("{}", e);
                report.failed.push(image.file_name.clone());
            }
        }
    }

    dated.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.file_name.cmp(&b.1.file_name)));

    let mut requests = Vec::with_capacity(dated.len());
    for (timestamp, image) in dated {
        let target = free_timestamp_name(&timestamp, &image.extension, &taken);
        taken.insert(target.to_lowercase());
        requests.push(RenameRequest::new(&image.file_name, &target));
    }

    report.rename = RenameExecutor::new(dir).rename_all(&requests, events);
    Ok(report)
}

/// First `_N` variant of the timestamp name not in `taken` (lowercased).
/// `taken` is finite, so the loop always ends.
fn free_timestamp_name(timestamp: &NaiveDateTime, extension: &str, taken: &HashSet<String>) -> String {
    let mut counter = 0u32;
    loop {
        let name = format_timestamp_name(timestamp, (counter > 0).then_some(counter), extension);
        if !taken.contains(&name.to_lowercase()) {
            return name;
        }
        counter += 1;
    }
}
