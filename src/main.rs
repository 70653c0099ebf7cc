//! # catalog-grouper CLI
//!
//! Command-line interface for the catalog grouper.
//!
//! ## Usage
//! ```bash
//! catalog-grouper group public/images --catalog public/data/items.json --target 70
//! catalog-grouper restore public/images --mapping public/data/image-mapping.json
//! ```

mod cli;

use catalog_grouper::Result;

fn main() -> Result<()> {
    catalog_grouper::init_tracing();
    cli::run()
}
