//! JSON persistence for the catalog and mapping files.
//!
//! Writes go to a temporary file in the destination directory which is then
//! persisted over the target, so readers never see a half-written file.

use super::types::Catalog;
use crate::error::CatalogError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Read and parse a JSON file
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Read and parse a JSON file, or `None` if there is no file at `path`
pub fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, CatalogError> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

/// Serialize to pretty JSON (two-space indent) and atomically replace `path`
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), CatalogError> {
    let write_error = |reason: String| CatalogError::Write {
        path: path.to_path_buf(),
        reason,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|e| write_error(e.to_string()))?;

    let temp = NamedTempFile::new_in(&parent).map_err(|e| write_error(e.to_string()))?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| write_error(e.to_string()))?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|e| write_error(e.to_string()))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|e| write_error(e.to_string()))?;

    temp.persist(path).map_err(|e| write_error(e.error.to_string()))?;
    Ok(())
}

/// The catalog JSON file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog; a missing file is an error
    pub fn load(&self) -> Result<Catalog, CatalogError> {
        read_json(&self.path)
    }

    /// Load the catalog, or an empty one if the file does not exist yet
    pub fn load_or_default(&self) -> Result<Catalog, CatalogError> {
        Ok(read_json_if_exists(&self.path)?.unwrap_or_default())
    }

    /// Atomically write the catalog
    pub fn save(&self, catalog: &Catalog) -> Result<(), CatalogError> {
        write_json_atomic(&self.path, catalog)
    }
}
