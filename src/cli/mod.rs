//! # CLI Module
//!
//! Command-line interface for the catalog grouper.
//!
//! ## Usage
//! ```bash
//! # Group photos into about 70 items and write the catalog
//! catalog-grouper group public/for-sale/images --catalog src/data/items.json
//!
//! # Fixed 45 second threshold, preview only
//! catalog-grouper group public/for-sale/images --catalog src/data/items.json --threshold 45 --dry-run
//!
//! # After marking split photos with x/y suffixes
//! catalog-grouper regroup public/for-sale/images --catalog src/data/items.json
//!
//! # Undo a run
//! catalog-grouper restore public/for-sale/images --mapping src/data/image-mapping.json
//! ```

use catalog_grouper::core::catalog::{sync_catalog, CatalogStore, ItemDefaults, SyncReport};
use catalog_grouper::core::grouper::{GroupingStats, SearchConfig, DEFAULT_TARGET_GROUPS, DEFAULT_THRESHOLD_SECS};
use catalog_grouper::core::pipeline::{
    AppliedPlan, GroupingAnalysis, GroupingMode, Pipeline, PipelineBuilder, PipelineResult,
    RegroupResult,
};
use catalog_grouper::core::rename::{
    restore_from_exif, restore_from_mapping, ExifRestoreReport, MappingRestoreReport, RenameReport,
};
use catalog_grouper::core::scanner::ScanConfig;
use catalog_grouper::error::Result;
use catalog_grouper::events::{
    Event, EventChannel, EventReceiver, PipelineEvent, RenameEvent, ResolveEvent, ScanEvent,
};
use clap::{Parser, Subcommand, ValueEnum};
use console::{style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

/// Catalog Grouper - Turn a folder of item photos into a catalog
#[derive(Parser, Debug)]
#[command(name = "catalog-grouper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Group photos by time, rename them and write the catalog
    Group {
        /// Directory holding the photos
        dir: PathBuf,

        /// Catalog JSON file to write
        #[arg(short, long)]
        catalog: PathBuf,

        /// Mapping file (default: image-mapping.json next to the catalog)
        #[arg(short, long, conflicts_with = "no_mapping")]
        mapping: Option<PathBuf>,

        /// Do not read or write a mapping file
        #[arg(long)]
        no_mapping: bool,

        /// Aim for about this many items (default 70)
        #[arg(long, conflicts_with = "threshold")]
        target: Option<usize>,

        /// Use a fixed gap threshold in seconds instead of searching
        #[arg(short, long)]
        threshold: Option<u32>,

        /// Smallest threshold the search may pick
        #[arg(long, default_value = "10")]
        min_threshold: u32,

        /// Largest threshold the search may pick
        #[arg(long, default_value = "300")]
        max_threshold: u32,

        /// Maximum number of search probes
        #[arg(long, default_value = "20")]
        iterations: u32,

        #[command(flatten)]
        items: ItemArgs,

        /// File extensions to include (default: jpg, jpeg)
        #[arg(short, long = "extension")]
        extensions: Vec<String>,

        /// Show the plan without renaming or writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Renumber items from hand-edited item-N-M[x|y] names
    Regroup {
        /// Directory holding the photos
        dir: PathBuf,

        /// Catalog JSON file to write
        #[arg(short, long)]
        catalog: PathBuf,

        /// Mapping file (default: image-mapping.json next to the catalog)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        #[command(flatten)]
        items: ItemArgs,

        /// Show the plan without renaming or writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Give renamed photos their original names back
    Restore {
        /// Directory holding the photos
        dir: PathBuf,

        /// Restore the names recorded in this mapping file
        #[arg(short, long, conflicts_with = "from_exif", required_unless_present = "from_exif")]
        mapping: Option<PathBuf>,

        /// Rebuild timestamp names from EXIF capture times
        #[arg(long)]
        from_exif: bool,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Make the catalog match the item-N-M files on disk
    Sync {
        /// Directory holding the photos
        dir: PathBuf,

        /// Catalog JSON file to update
        #[arg(short, long)]
        catalog: PathBuf,

        #[command(flatten)]
        items: ItemArgs,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },

    /// Show how photos would be grouped, without changing anything
    Gaps {
        /// Directory holding the photos
        dir: PathBuf,

        /// Fixed gap threshold in seconds (default 60)
        #[arg(short, long, conflicts_with = "target")]
        threshold: Option<u32>,

        /// Search for the threshold giving about this many items
        #[arg(long)]
        target: Option<usize>,

        /// Mapping file used to recover original capture times
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,
    },
}

/// Values for newly created catalog items
#[derive(clap::Args, Debug)]
struct ItemArgs {
    /// Placeholder price for new items
    #[arg(long, default_value = "100")]
    price: u32,

    /// Category id for new items (repeatable)
    #[arg(long = "category", default_values_t = vec![1u32])]
    categories: Vec<u32>,

    /// Prefix of each image path in the catalog
    #[arg(long, default_value = "/for-sale/images/")]
    url_prefix: String,
}

impl From<ItemArgs> for ItemDefaults {
    fn from(args: ItemArgs) -> Self {
        ItemDefaults {
            categories: args.categories,
            price: args.price,
            image_url_prefix: args.url_prefix,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    fn is_pretty(self) -> bool {
        matches!(self, OutputFormat::Pretty)
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let term = Term::stderr();

    match cli.command {
        Commands::Group {
            dir,
            catalog,
            mapping,
            no_mapping,
            target,
            threshold,
            min_threshold,
            max_threshold,
            iterations,
            items,
            extensions,
            dry_run,
            output,
            verbose,
        } => {
            let builder = Pipeline::builder()
                .image_dir(dir)
                .catalog(catalog)
                .search(SearchConfig {
                    min_threshold_secs: min_threshold,
                    max_threshold_secs: max_threshold,
                    max_iterations: iterations,
                })
                .scan_config(ScanConfig {
                    include_hidden: false,
                    extensions: (!extensions.is_empty()).then_some(extensions),
                })
                .item_defaults(items.into())
                .dry_run(dry_run);
            let pipeline = with_mapping(builder, mapping, no_mapping)
                .grouping(group_mode(threshold, target))
                .build()?;

            print_header(&term, output);
            let (sender, receiver) = EventChannel::new();
            let events = spawn_progress(receiver, output.is_pretty());
            let result = pipeline.run_with_events(&sender);
            drop(sender);
            events.join().ok();
            let result = result?;

            match output {
                OutputFormat::Pretty => print_group_results(&term, &result, pipeline.config().mapping_path.as_deref(), verbose),
                OutputFormat::Json => print_json(&result),
            }
        }

        Commands::Regroup {
            dir,
            catalog,
            mapping,
            items,
            dry_run,
            output,
        } => {
            let builder = Pipeline::builder()
                .image_dir(dir)
                .catalog(catalog)
                .item_defaults(items.into())
                .dry_run(dry_run);
            let pipeline = with_mapping(builder, mapping, false).build()?;

            print_header(&term, output);
            let (sender, receiver) = EventChannel::new();
            let events = spawn_progress(receiver, output.is_pretty());
            let result = pipeline.regroup_with_events(&sender);
            drop(sender);
            events.join().ok();
            let result = result?;

            match output {
                OutputFormat::Pretty => print_regroup_results(&term, &result),
                OutputFormat::Json => print_json(&result),
            }
        }

        Commands::Restore {
            dir,
            mapping,
            from_exif,
            output,
        } => {
            print_header(&term, output);
            let (sender, receiver) = EventChannel::new();
            let events = spawn_progress(receiver, output.is_pretty());
            let result = match mapping {
                Some(path) if !from_exif => restore_from_mapping(&dir, &path, &sender).map(Restored::Mapping),
                _ => restore_from_exif(&dir, ScanConfig::default(), &sender).map(Restored::Exif),
            };
            drop(sender);
            events.join().ok();
            let result = result?;

            match output {
                OutputFormat::Pretty => print_restore_results(&term, &result),
                OutputFormat::Json => print_json(&result),
            }
        }

        Commands::Sync {
            dir,
            catalog,
            items,
            output,
        } => {
            print_header(&term, output);
            let store = CatalogStore::new(catalog);
            let report = sync_catalog(&dir, &store, &items.into(), ScanConfig::default())?;

            match output {
                OutputFormat::Pretty => print_sync_results(&term, &report, store.path()),
                OutputFormat::Json => print_json(&report),
            }
        }

        Commands::Gaps {
            dir,
            threshold,
            target,
            mapping,
            output,
        } => {
            let mut builder = Pipeline::builder().image_dir(dir);
            builder = match mapping {
                Some(path) => builder.mapping(path),
                None => builder.no_mapping(),
            };
            let pipeline = builder.grouping(gaps_mode(threshold, target)).build()?;

            print_header(&term, output);
            let (sender, receiver) = EventChannel::new();
            let events = spawn_progress(receiver, output.is_pretty());
            let analysis = pipeline.analyze(&sender);
            drop(sender);
            events.join().ok();
            let analysis = analysis?;

            match output {
                OutputFormat::Pretty => print_gap_results(&term, &analysis),
                OutputFormat::Json => print_json(&analysis),
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
#[serde(untagged)]
enum Restored {
    Mapping(MappingRestoreReport),
    Exif(ExifRestoreReport),
}

/// `group`: search for the target count unless a fixed threshold is given
fn group_mode(threshold: Option<u32>, target: Option<usize>) -> GroupingMode {
    match threshold {
        Some(secs) => GroupingMode::FixedThreshold(secs),
        None => GroupingMode::TargetGroups(target.unwrap_or(DEFAULT_TARGET_GROUPS)),
    }
}

/// `gaps`: inspect the default fixed threshold unless a target is given
fn gaps_mode(threshold: Option<u32>, target: Option<usize>) -> GroupingMode {
    match target {
        Some(count) => GroupingMode::TargetGroups(count),
        None => GroupingMode::FixedThreshold(threshold.unwrap_or(DEFAULT_THRESHOLD_SECS)),
    }
}

fn with_mapping(builder: PipelineBuilder, mapping: Option<PathBuf>, disabled: bool) -> PipelineBuilder {
    match (mapping, disabled) {
        (_, true) => builder.no_mapping(),
        (Some(path), false) => builder.mapping(path),
        (None, false) => builder,
    }
}

fn print_header(term: &Term, output: OutputFormat) {
    if output.is_pretty() {
        term.write_line(&format!(
            "{} {}",
            style("Catalog Grouper").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }
}

/// Draw a progress bar from pipeline events until the sender is dropped
fn spawn_progress(receiver: EventReceiver, enabled: bool) -> JoinHandle<()> {
    let progress = if enabled {
        let pb = ProgressBar::new(0);
        if let Ok(progress_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(progress_style.progress_chars("█▓░"));
        }
        Some(pb)
    } else {
        None
    };

    thread::spawn(move || {
        let Some(pb) = progress else {
            for _ in receiver.iter() {}
            return;
        };

        for event in receiver.iter() {
            match event {
                Event::Pipeline(PipelineEvent::PhaseChanged { phase }) => {
                    pb.set_message(format!("{}", phase));
                }
                Event::Scan(ScanEvent::Completed { total_images }) => {
                    pb.set_length(total_images as u64);
                }
                Event::Resolve(ResolveEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Rename(RenameEvent::Started { total }) => {
                    pb.set_length(total as u64);
                    pb.set_position(0);
                }
                Event::Rename(RenameEvent::Progress(p)) => {
                    pb.set_position(p.completed as u64);
                }
                Event::Rename(RenameEvent::Collision {
                    source_name,
                    target_name,
                }) => {
                    pb.println(format!(
                        "  {} {} not renamed: {} already exists",
                        style("!").yellow().bold(),
                        source_name,
                        target_name
                    ));
                }
                Event::Rename(RenameEvent::Failed {
                    source_name,
                    message,
                }) => {
                    pb.println(format!("  {} {}: {}", style("✗").red().bold(), source_name, message));
                }
                Event::Pipeline(PipelineEvent::Completed { .. }) | Event::Rename(RenameEvent::Completed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
        pb.finish_and_clear();
    })
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize output: {}", e),
    }
}

fn print_group_results(term: &Term, result: &PipelineResult, mapping_path: Option<&Path>, verbose: bool) {
    let analysis = &result.analysis;
    let applied = &result.applied;

    term.write_line(&format!(
        "{} {}",
        style("✓").green().bold(),
        if applied.dry_run { "Plan ready (dry run)" } else { "Catalog written" }
    ))
    .ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} photos found in {:.1}s",
        style(analysis.images_found).cyan(),
        result.duration_ms as f64 / 1000.0
    ))
    .ok();
    for (source, count) in &analysis.sources {
        term.write_line(&format!("    {} dated from {}", style(count).dim(), source)).ok();
    }
    if !analysis.unresolved.is_empty() {
        term.write_line(&format!(
            "  {} photos without a usable timestamp were left out",
            style(analysis.unresolved.len()).yellow()
        ))
        .ok();
        if verbose {
            for path in &analysis.unresolved {
                term.write_line(&format!("    {} {}", style("○").dim(), path.display())).ok();
            }
        }
    }

    let threshold_line = match &analysis.choice {
        Some(choice) => format!(
            "  {}s threshold gives {} items (target {}, {} probes)",
            style(choice.threshold_secs).cyan(),
            style(choice.group_count).cyan(),
            choice.target,
            choice.probes.len()
        ),
        None => format!(
            "  {}s threshold gives {} items",
            style(analysis.threshold_secs).cyan(),
            style(analysis.groups.len()).cyan()
        ),
    };
    term.write_line(&threshold_line).ok();
    print_stats(term, &analysis.stats);
    print_rename_summary(term, &applied.report, applied.dry_run);

    if verbose {
        print_plan(term, applied);
    }

    term.write_line("").ok();
    if let Some(path) = mapping_path {
        term.write_line(&format!(
            "{}",
            style(format!("Original names are recorded in {}", path.display())).dim()
        ))
        .ok();
    }
}

fn print_regroup_results(term: &Term, result: &RegroupResult) {
    term.write_line(&format!(
        "{} {}",
        style("✓").green().bold(),
        if result.applied.dry_run { "Regroup planned (dry run)" } else { "Regrouped" }
    ))
    .ok();
    term.write_line("").ok();
    term.write_line(&format!(
        "  {} photos in {} items",
        style(result.applied.plan.total_photos()).cyan(),
        style(result.applied.plan.items.len()).cyan()
    ))
    .ok();
    if !result.skipped.is_empty() {
        term.write_line(&format!(
            "  {} item-* names skipped: {}",
            style(result.skipped.len()).yellow(),
            result.skipped.join(", ")
        ))
        .ok();
    }
    print_rename_summary(term, &result.applied.report, result.applied.dry_run);
}

fn print_restore_results(term: &Term, restored: &Restored) {
    term.write_line(&format!("{} Restore complete", style("✓").green().bold())).ok();
    term.write_line("").ok();

    match restored {
        Restored::Mapping(report) => {
            print_rename_summary(term, &report.rename, false);
            if !report.already_restored.is_empty() {
                term.write_line(&format!(
                    "  {} already had their original name",
                    style(report.already_restored.len()).dim()
                ))
                .ok();
            }
            if !report.missing.is_empty() {
                term.write_line(&format!(
                    "  {} mapped files not found: {}",
                    style(report.missing.len()).yellow(),
                    report.missing.join(", ")
                ))
                .ok();
            }
            term.write_line(&format!(
                "  {} entries left in the mapping",
                style(report.remaining_entries).cyan()
            ))
            .ok();
        }
        Restored::Exif(report) => {
            print_rename_summary(term, &report.rename, false);
            term.write_line(&format!(
                "  {} already named by timestamp",
                style(report.unchanged).dim()
            ))
            .ok();
            if !report.failed.is_empty() {
                term.write_line(&format!(
                    "  {} without an EXIF capture time: {}",
                    style(report.failed.len()).yellow(),
                    report.failed.join(", ")
                ))
                .ok();
            }
        }
    }
}

fn print_sync_results(term: &Term, report: &SyncReport, catalog: &Path) {
    term.write_line(&format!(
        "{} Catalog synced: {}",
        style("✓").green().bold(),
        catalog.display()
    ))
    .ok();
    term.write_line("").ok();
    term.write_line(&format!("  {} items", style(report.total).cyan())).ok();
    term.write_line(&format!(
        "  {} kept ({} with new images)",
        report.kept, report.images_updated
    ))
    .ok();
    term.write_line(&format!("  {} added", report.added)).ok();
    if !report.dropped.is_empty() {
        let ids: Vec<String> = report.dropped.iter().map(u32::to_string).collect();
        term.write_line(&format!(
            "  {} dropped: {}",
            style(report.dropped.len()).yellow(),
            ids.join(", ")
        ))
        .ok();
    }
}

fn print_gap_results(term: &Term, analysis: &GroupingAnalysis) {
    term.write_line(&format!(
        "  {} photos dated, {} left out",
        style(analysis.stats.image_count).cyan(),
        analysis.unresolved.len()
    ))
    .ok();
    if let Some(choice) = &analysis.choice {
        for (threshold, count) in &choice.probes {
            term.write_line(&format!("    {:>4}s -> {} items", threshold, count)).ok();
        }
    }
    term.write_line(&format!(
        "  {}s threshold gives {} items",
        style(analysis.threshold_secs).cyan(),
        style(analysis.groups.len()).cyan()
    ))
    .ok();
    print_stats(term, &analysis.stats);

    if !analysis.stats.sample_gaps.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("First gaps:").bold().underlined())).ok();
        for gap in &analysis.stats.sample_gaps {
            let verdict = if gap.starts_new_item {
                style("new item").yellow()
            } else {
                style("same item").dim()
            };
            term.write_line(&format!("  {:>8.1}s  {}", gap.seconds, verdict)).ok();
        }
    }
}

fn print_stats(term: &Term, stats: &GroupingStats) {
    if stats.group_count == 0 {
        return;
    }
    term.write_line(&format!(
        "  {} to {} photos per item, {:.1} on average",
        stats.min_size, stats.max_size, stats.average_size
    ))
    .ok();
}

fn print_rename_summary(term: &Term, report: &RenameReport, dry_run: bool) {
    let verb = if dry_run { "to rename" } else { "renamed" };
    term.write_line(&format!("  {} {}", style(report.renamed_count()).cyan(), verb)).ok();

    let collisions = report.collisions().count();
    if collisions > 0 {
        term.write_line(&format!(
            "  {} kept their name to avoid overwriting a file",
            style(collisions).yellow()
        ))
        .ok();
    }
    for failure in report.failures() {
        term.write_line(&format!(
            "  {} {} could not be renamed",
            style("✗").red(),
            failure.source_name
        ))
        .ok();
    }
}

fn print_plan(term: &Term, applied: &AppliedPlan) {
    term.write_line("").ok();
    term.write_line(&format!("{}", style("Items:").bold().underlined())).ok();
    for item in &applied.plan.items {
        term.write_line(&format!(
            "  {} ({} photos)",
            style(format!("Item {}:", item.id)).bold(),
            item.photos.len()
        ))
        .ok();
        for photo in &item.photos {
            let marker = if photo.is_unchanged() {
                style("=").dim().to_string()
            } else {
                style("→").green().to_string()
            };
            term.write_line(&format!("    {} {} {}", photo.source_name, marker, photo.target_name)).ok();
        }
    }
}
