//! # Scanner Module
//!
//! Lists the candidate images in the catalog's image directory.
//!
//! Only the top level of the directory is read: catalog images live side
//! by side, and sub-folders (thumbnails, originals) are not part of a run.
//!
//! ## Example
//! ```rust,ignore
//! use catalog_grouper::core::scanner::{DirectoryScanner, ImageScanner, ScanConfig};
//!
//! let scanner = DirectoryScanner::new(ScanConfig::default());
//! let result = scanner.scan(Path::new("public/images"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{DirectoryScanner, ScanConfig};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// An image file found in the image directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Full path to the file
    pub path: PathBuf,
    /// File name including extension
    pub file_name: String,
    /// Lowercased extension without the dot
    pub extension: String,
}

impl ImageFile {
    /// Build from a path, returning `None` for names that are not valid UTF-8
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        Some(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
        })
    }
}

/// Result of listing a directory
#[derive(Debug)]
pub struct ScanResult {
    /// Images found, sorted by file name
    pub images: Vec<ImageFile>,
    /// Entries that could not be read (non-fatal)
    pub errors: Vec<ScanError>,
}

/// Trait for image scanners
pub trait ImageScanner {
    /// List images in a directory
    fn scan(&self, dir: &Path) -> Result<ScanResult, ScanError>;

    /// List images, reporting each one as an event
    fn scan_with_events(&self, dir: &Path, events: &EventSender) -> Result<ScanResult, ScanError>;
}
