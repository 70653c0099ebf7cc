//! Capture time from EXIF metadata.

use crate::error::TimestampError;
use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// EXIF tags tried in order: when the shutter fired, when it was digitised,
/// when the file was last modified by the camera
pub const DEFAULT_CAPTURE_TAGS: &[Tag] = &[Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Read the first present and parseable capture time among `tags`.
///
/// `Ok(None)` means the file has EXIF data but none of the tags; an error
/// means the metadata could not be read at all.
pub fn read_capture_time(path: &Path, tags: &[Tag]) -> Result<Option<NaiveDateTime>, TimestampError> {
    let metadata_error = |reason: String| TimestampError::MetadataRead {
        path: path.to_path_buf(),
        reason,
    };

    let file = File::open(path).map_err(|e| metadata_error(e.to_string()))?;
    let mut bufreader = BufReader::new(file);
    let exif = Reader::new()
        .read_from_container(&mut bufreader)
        .map_err(|e| metadata_error(e.to_string()))?;

    Ok(tags.iter().find_map(|tag| {
        exif.get_field(*tag, In::PRIMARY)
            .and_then(|field| ascii_value(&field.value))
            .and_then(|s| parse_exif_datetime(&s))
    }))
}

/// Parse an EXIF date-time, `YYYY:MM:DD HH:MM:SS` (some writers use dashes)
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_matches(|c: char| c == '"' || c == '\0' || c.is_whitespace());

    NaiveDateTime::parse_from_str(s, "%Y:%m:%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(vec) => vec
            .first()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
            .map(str::to_string),
        _ => None,
    }
}
