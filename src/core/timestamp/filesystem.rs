//! File system times, the least reliable source.

use chrono::{DateTime, Local, NaiveDateTime};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

/// Creation time, or modification time when creation time is unavailable
/// or reported as the Unix epoch.
pub fn file_time(path: &Path) -> Option<NaiveDateTime> {
    let metadata = fs::metadata(path).ok()?;

    let time = metadata
        .created()
        .ok()
        .filter(|t| *t > SystemTime::UNIX_EPOCH)
        .or_else(|| metadata.modified().ok().filter(|t| *t > SystemTime::UNIX_EPOCH))?;

    let local: DateTime<Local> = time.into();
    Some(local.naive_local())
}
