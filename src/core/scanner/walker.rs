//! Directory listing implementation using walkdir.

use super::{filter::ImageFilter, ImageFile, ImageScanner, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::path::Path;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Whether to include hidden files
    pub include_hidden: bool,
    /// Custom extensions to include (None = jpg/jpeg)
    pub extensions: Option<Vec<String>>,
}

/// Scanner that lists the top level of one directory
pub struct DirectoryScanner {
    filter: ImageFilter,
}

impl DirectoryScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(extensions) = config.extensions {
            filter = filter.with_extensions(extensions);
        }

        Self { filter }
    }
}

impl ImageScanner for DirectoryScanner {
    fn scan(&self, dir: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(dir, &null_sender())
    }

    fn scan_with_events(&self, dir: &Path, events: &EventSender) -> Result<ScanResult, ScanError> {
        if !dir.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: dir.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            path: dir.to_path_buf(),
        }));

        let mut images = Vec::new();
        let mut errors = Vec::new();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry_result in walker {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(dir).to_path_buf();
                    errors.push(ScanError::ReadDirectory {
                        path,
                        source: e.into(),
                    });
                    continue;
                }
            };

            if !entry.file_type().is_file() || !self.filter.should_include(entry.path()) {
                continue;
            }

            match ImageFile::from_path(entry.path()) {
                Some(image) => {
                    events.send(Event::Scan(ScanEvent::ImageFound {
                        path: image.path.clone(),
                    }));
                    images.push(image);
                }
                None => {
                    tracing::warn!(path = %entry.path().display(), "skipping file with non UTF-8 name");
                }
            }
        }

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(ScanResult { images, errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn scan_lists_images_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        for name in ["b.jpg", "a.JPG", "c.txt", ".gitkeep"] {
            fs::write(temp.path().join(name), b"x").unwrap();
        }

        let result = DirectoryScanner::new(ScanConfig::default())
            .scan(temp.path())
            .unwrap();

        let names: Vec<_> = result.images.iter().map(|i| i.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.JPG", "b.jpg"]);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn scan_does_not_descend_into_subfolders() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("thumbs")).unwrap();
        fs::write(temp.path().join("thumbs").join("item-1-1.jpg"), b"x").unwrap();
        fs::write(temp.path().join("item-2-1.jpg"), b"x").unwrap();

        let result = DirectoryScanner::new(ScanConfig::default())
            .scan(temp.path())
            .unwrap();

        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].file_name, "item-2-1.jpg");
    }

    #[test]
    fn scan_missing_directory_fails() {
        let result = DirectoryScanner::new(ScanConfig::default())
            .scan(Path::new("/nonexistent/images"));
        assert!(matches!(result, Err(ScanError::DirectoryNotFound { .. })));
    }
}
