//! # Catalog Module
//!
//! The catalog JSON document, the provenance mapping file, and keeping the
//! catalog in step with the files on disk.
//!
//! Both files are rewritten atomically: a temporary file in the same
//! directory is persisted over the old one.

mod mapping;
mod store;
mod sync;
mod types;

pub use mapping::ProvenanceMapping;
pub use store::{read_json, read_json_if_exists, write_json_atomic, CatalogStore};
pub use sync::{sync_catalog, SyncReport};
pub use types::{Catalog, CatalogItem, ItemDefaults, LocalizedText};

/// Mapping file name used when none is given
pub const DEFAULT_MAPPING_FILE: &str = "image-mapping.json";
