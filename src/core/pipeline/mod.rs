//! # Pipeline Module
//!
//! Orchestrates a full catalog run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - List the photos in the image directory
//! 2. **Resolve** - Find each photo's capture time
//! 3. **Group** - Sort, pick a threshold, split on long gaps
//! 4. **Rename** - Write the mapping, then rename in two phases
//! 5. **Catalog** - Write one placeholder item per group
//!
//! A regroup run replaces stages 2 and 3 with the item numbers already in
//! the file names.

mod apply;
mod executor;

pub use apply::AppliedPlan;
pub use executor::{
    default_mapping_path, GroupingAnalysis, GroupingMode, Pipeline, PipelineBuilder,
    PipelineConfig, PipelineResult, RegroupResult,
};
