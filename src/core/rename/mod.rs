//! # Rename Module
//!
//! Gives grouped photos their catalog names.
//!
//! ## Steps
//! 1. [`RenamePlanner`] numbers items and photos and builds target names
//! 2. [`RenameExecutor::preflight`] drops renames that would overwrite a file
//! 3. [`RenameExecutor::execute`] renames in two phases through staging names
//! 4. [`build_catalog`] emits one catalog item per planned item
//!
//! [`restore_from_mapping`] and [`restore_from_exif`] undo a run;
//! [`SuffixRegrouper`] rebuilds groups from hand-edited canonical names.

mod emitter;
mod executor;
mod naming;
mod planner;
mod regroup;
mod restore;
mod types;

pub use emitter::{build_catalog, carry_over_edits, final_name};
pub use executor::RenameExecutor;
pub use naming::{staging_name, CanonicalName};
pub use planner::RenamePlanner;
pub use regroup::{Regrouping, SuffixRegrouper};
pub use restore::{restore_from_exif, restore_from_mapping, ExifRestoreReport, MappingRestoreReport};
pub use types::*;
