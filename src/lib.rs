//! # Catalog Grouper
//!
//! Turns a folder of item photos into a for-sale catalog.
//!
//! ## Core Philosophy
//! - **Never lose provenance** - the new-name to original-name mapping is written before any rename
//! - **Never overwrite** - renames go through unique staging names and refuse to clobber files
//! - **Report, don't drop** - images without a usable timestamp are listed, not silently skipped
//!
//! ## Architecture
//! - `core` - Scanning, timestamp resolution, grouping, renaming and catalog output
//! - `events` - Event-driven progress reporting
//! - `error` - Error taxonomy
//! - `cli` - Command-line interface (binary only)

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{GrouperError, Result};

/// Initialize tracing for the library
///
/// Reads the filter from `RUST_LOG`, defaulting to `warn` so that skipped
/// images and rename collisions are always visible. Does nothing if a
/// global subscriber is already installed.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
