//! # Core Module
//!
//! The catalog building engine, independent of the CLI.
//!
//! ## Modules
//! - `scanner` - Lists photos in the image directory
//! - `timestamp` - Finds when each photo was taken
//! - `grouper` - Splits photos into items by time gaps
//! - `rename` - Plans and performs the renames
//! - `catalog` - Catalog and mapping files
//! - `pipeline` - Orchestrates the full workflow

pub mod catalog;
pub mod grouper;
pub mod pipeline;
pub mod rename;
pub mod scanner;
pub mod timestamp;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogItem, ProvenanceMapping};
pub use grouper::{Group, TimeGapGrouper};
pub use pipeline::{Pipeline, PipelineResult};
pub use scanner::ImageFile;
pub use timestamp::TimestampedImage;
