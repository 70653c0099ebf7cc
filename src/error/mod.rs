//! # Error Module
//!
//! Error types for the catalog grouper.
//!
//! ## Severity
//! - **Fatal** - scan failures, provenance mapping and catalog write failures abort the run
//! - **Per-file** - unresolvable timestamps and rename collisions are reported and the run continues
//! - **Fallback** - metadata read failures only move resolution to the next strategy

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum GrouperError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Timestamp error: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("Rename error: {0}")]
    Rename(#[from] RenameError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors that occur while listing the image directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while resolving an image timestamp
#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("No usable timestamp for {path} (filename, metadata and file times all failed)")]
    Unresolvable { path: PathBuf },

    #[error("Failed to read capture metadata from {path}: {reason}")]
    MetadataRead { path: PathBuf, reason: String },
}

/// Errors that occur while renaming a single file
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Refusing to rename {source_name} to {target}: target already exists")]
    Collision { source_name: String, target: PathBuf },

    #[error("Failed to rename {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Source file not found: {path}")]
    SourceMissing { path: PathBuf },
}

/// Errors that occur reading or writing the catalog and mapping files
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Failed to write {path}: {reason}. Earlier renames are recorded in the mapping file.")]
    Write { path: PathBuf, reason: String },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, GrouperError>;
