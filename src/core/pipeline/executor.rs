//! Pipeline execution implementation.

use super::apply::{apply_plan, AppliedPlan};
use crate::core::catalog::{ItemDefaults, ProvenanceMapping, DEFAULT_MAPPING_FILE};
use crate::core::grouper::{
    sort_chronologically, Group, GroupingStats, SearchConfig, ThresholdChoice, ThresholdSearch,
    TimeGapGrouper, DEFAULT_TARGET_GROUPS,
};
use crate::core::rename::{PhotoRef, RenamePlanner, SuffixRegrouper};
use crate::core::scanner::{DirectoryScanner, ImageScanner, ScanConfig};
use crate::core::timestamp::{ResolverStrategy, TimestampResolver, TimestampSource};
use crate::error::{GrouperError, Result};
use crate::events::{
    null_sender, Event, EventSender, GroupEvent, PipelineEvent, PipelinePhase, PipelineSummary,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// How the grouping threshold is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// Use this many seconds
    FixedThreshold(u32),
    /// Search for the threshold giving about this many items
    TargetGroups(usize),
}

impl Default for GroupingMode {
    fn default() -> Self {
        GroupingMode::TargetGroups(DEFAULT_TARGET_GROUPS)
    }
}

/// Configuration for the pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the photos
    pub image_dir: PathBuf,
    /// Catalog JSON file to write
    pub catalog_path: PathBuf,
    /// Provenance mapping file; `None` disables it
    pub mapping_path: Option<PathBuf>,
    pub grouping: GroupingMode,
    pub search: SearchConfig,
    pub scan_config: ScanConfig,
    pub strategies: Vec<ResolverStrategy>,
    pub item_defaults: ItemDefaults,
    /// Plan and report without touching any file
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::new(),
            catalog_path: PathBuf::from("items.json"),
            mapping_path: Some(PathBuf::from(DEFAULT_MAPPING_FILE)),
            grouping: GroupingMode::default(),
            search: SearchConfig::default(),
            scan_config: ScanConfig::default(),
            strategies: TimestampResolver::default().strategies().to_vec(),
            item_defaults: ItemDefaults::default(),
            dry_run: false,
        }
    }
}

/// Builder for pipeline configuration
pub struct PipelineBuilder {
    config: PipelineConfig,
    mapping_path: Option<PathBuf>,
    mapping_enabled: bool,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            mapping_path: None,
            mapping_enabled: true,
        }
    }

    /// Directory holding the photos
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.image_dir = dir.into();
        self
    }

    /// Catalog file to write
    pub fn catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.catalog_path = path.into();
        self
    }

    /// Mapping file location (default: `image-mapping.json` next to the catalog)
    pub fn mapping(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_path = Some(path.into());
        self
    }

    /// Do not read or write a mapping file
    pub fn no_mapping(mut self) -> Self {
        self.mapping_enabled = false;
        self
    }

    /// Group with a fixed threshold in seconds
    pub fn threshold(mut self, secs: u32) -> Self {
        self.config.grouping = GroupingMode::FixedThreshold(secs);
        self
    }

    /// Search for the threshold giving about `count` items
    pub fn target_groups(mut self, count: usize) -> Self {
        self.config.grouping = GroupingMode::TargetGroups(count);
        self
    }

    /// How the threshold is chosen
    pub fn grouping(mut self, mode: GroupingMode) -> Self {
        self.config.grouping = mode;
        self
    }

    /// Bounds for the threshold search
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.config.search = search;
        self
    }

    /// Set scanner configuration
    pub fn scan_config(mut self, config: ScanConfig) -> Self {
        self.config.scan_config = config;
        self
    }

    /// Timestamp strategies, in the order they are tried
    pub fn strategies(mut self, strategies: Vec<ResolverStrategy>) -> Self {
        self.config.strategies = strategies;
        self
    }

    /// Values for newly created catalog items
    pub fn item_defaults(mut self, defaults: ItemDefaults) -> Self {
        self.config.item_defaults = defaults;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    /// Build the pipeline, checking the configuration
    pub fn build(mut self) -> Result<Pipeline> {
        if self.config.image_dir.as_os_str().is_empty() {
            return Err(GrouperError::Config("no image directory given".to_string()));
        }
        if self.config.strategies.is_empty() {
            return Err(GrouperError::Config("no timestamp strategies given".to_string()));
        }
        let search = ThresholdSearch::new(self.config.search)?;

        self.config.mapping_path = if self.mapping_enabled {
            Some(
                self.mapping_path
                    .unwrap_or_else(|| default_mapping_path(&self.config.catalog_path)),
            )
        } else {
            None
        };

        Ok(Pipeline {
            config: self.config,
            search,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `image-mapping.json` in the catalog's directory
pub fn default_mapping_path(catalog_path: &Path) -> PathBuf {
    catalog_path
        .parent()
        .map(|p| p.join(DEFAULT_MAPPING_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPPING_FILE))
}

/// Everything known before any file is renamed
#[derive(Debug, Clone, Serialize)]
pub struct GroupingAnalysis {
    pub images_found: usize,
    /// How many images each strategy dated
    pub sources: BTreeMap<TimestampSource, usize>,
    /// Images left out because no strategy dated them
    pub unresolved: Vec<PathBuf>,
    /// Directory entries that could not be read
    pub scan_errors: Vec<String>,
    /// Present when the threshold was searched for
    pub choice: Option<ThresholdChoice>,
    pub threshold_secs: u32,
    pub groups: Vec<Group>,
    pub stats: GroupingStats,
}

/// Result of a full run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub analysis: GroupingAnalysis,
    pub applied: AppliedPlan,
    pub duration_ms: u64,
}

/// Result of a regroup run
#[derive(Debug, Clone, Serialize)]
pub struct RegroupResult {
    pub images_found: usize,
    /// `item-*` names that could not be parsed
    pub skipped: Vec<String>,
    pub applied: AppliedPlan,
    pub duration_ms: u64,
}

/// Scan, date, group, rename and write the catalog
pub struct Pipeline {
    config: PipelineConfig,
    search: ThresholdSearch,
}

impl Pipeline {
    /// Create a new pipeline builder
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn previous_mapping(&self) -> Result<ProvenanceMapping> {
        match &self.config.mapping_path {
            Some(path) => Ok(ProvenanceMapping::load(path)?),
            None => Ok(ProvenanceMapping::new()),
        }
    }

    /// Scan, resolve and group without changing anything on disk
    pub fn analyze(&self, events: &EventSender) -> Result<GroupingAnalysis> {
        let previous = self.previous_mapping()?;
        self.analyze_with(&previous, events)
    }

    fn analyze_with(&self, previous: &ProvenanceMapping, events: &EventSender) -> Result<GroupingAnalysis> {
        // Phase 1: Scanning
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));
        let scanner = DirectoryScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&self.config.image_dir, events)?;
        let scan_errors: Vec<String> = scan.errors.iter().map(|e| e.to_string()).collect();
        for error in &scan.errors {
            tracing::warn!("{}", error);
        }

        // Phase 2: Timestamps
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Resolving,
        }));
        let resolver =
            TimestampResolver::new(self.config.strategies.clone()).with_provenance(previous.clone());
        let resolved = resolver.resolve_all(&scan.images, events);

        let mut sources = BTreeMap::new();
        for image in &resolved.images {
            *sources.entry(image.source).or_insert(0) += 1;
        }
        tracing::info!(
            found = scan.images.len(),
            resolved = resolved.images.len(),
            unresolved = resolved.unresolved.len(),
            "timestamps resolved"
        );

        // Phase 3: Grouping
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let mut images = resolved.images;
        sort_chronologically(&mut images);

        let (threshold_secs, choice) = match self.config.grouping {
            GroupingMode::FixedThreshold(secs) => (secs, None),
            GroupingMode::TargetGroups(target) => {
                let choice = self.search.find_with_events(&images, target, events);
                tracing::info!(
                    threshold_secs = choice.threshold_secs,
                    groups = choice.group_count,
                    target,
                    "threshold chosen"
                );
                (choice.threshold_secs, Some(choice))
            }
        };

        let groups = TimeGapGrouper::new(threshold_secs).group_sorted(images);
        events.send(Event::Group(GroupEvent::ThresholdChosen {
            threshold_secs,
            group_count: groups.len(),
        }));
        events.send(Event::Group(GroupEvent::Completed {
            total_groups: groups.len(),
        }));
        let stats = GroupingStats::from_groups(&groups, threshold_secs);

        Ok(GroupingAnalysis {
            images_found: scan.images.len(),
            sources,
            unresolved: resolved.unresolved,
            scan_errors,
            choice,
            threshold_secs,
            groups,
            stats,
        })
    }

    /// Run the pipeline without events
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_with_events(&null_sender())
    }

    /// Run the pipeline with event reporting
    pub fn run_with_events(&self, events: &EventSender) -> Result<PipelineResult> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));

        let previous = self.previous_mapping()?;
        let analysis = self.analyze_with(&previous, events)?;

        let plan = RenamePlanner::plan(
            analysis
                .groups
                .iter()
                .map(|g| g.images.iter().map(PhotoRef::from).collect()),
        );
        let applied = apply_plan(plan, &self.config, &previous, events)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images: analysis.images_found,
                unresolved_images: analysis.unresolved.len(),
                threshold_secs: analysis.threshold_secs,
                total_items: applied.catalog.items.len(),
                renamed: applied.report.renamed_count(),
                duration_ms,
            },
        }));

        Ok(PipelineResult {
            analysis,
            applied,
            duration_ms,
        })
    }

    /// Renumber items from the current `item-N-M[x|y]` file names
    pub fn regroup_with_events(&self, events: &EventSender) -> Result<RegroupResult> {
        let start_time = Instant::now();
        events.send(Event::Pipeline(PipelineEvent::Started));
        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Scanning,
        }));

        let previous = self.previous_mapping()?;
        let scanner = DirectoryScanner::new(self.config.scan_config.clone());
        let scan = scanner.scan_with_events(&self.config.image_dir, events)?;

        events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
            phase: PipelinePhase::Grouping,
        }));
        let regrouping = SuffixRegrouper::new(&previous).regroup(&scan.images);
        events.send(Event::Group(GroupEvent::Completed {
            total_groups: regrouping.groups.len(),
        }));

        let plan = RenamePlanner::plan(regrouping.groups);
        let applied = apply_plan(plan, &self.config, &previous, events)?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        events.send(Event::Pipeline(PipelineEvent::Completed {
            summary: PipelineSummary {
                total_images: scan.images.len(),
                unresolved_images: 0,
                threshold_secs: 0,
                total_items: applied.catalog.items.len(),
                renamed: applied.report.renamed_count(),
                duration_ms,
            },
        }));

        Ok(RegroupResult {
            images_found: scan.images.len(),
            skipped: regrouping.skipped,
            applied,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"jpeg").unwrap();
    }

    #[test]
    fn pipeline_builder_defaults_mapping_next_to_catalog() {
        let pipeline = Pipeline::builder()
            .image_dir("/site/public/for-sale/images")
            .catalog("/site/src/data/items.json")
            .build()
            .unwrap();

        assert_eq!(
            pipeline.config().mapping_path,
            Some(PathBuf::from("/site/src/data/image-mapping.json"))
        );
        assert_eq!(pipeline.config().grouping, GroupingMode::TargetGroups(70));
    }

    #[test]
    fn pipeline_builder_can_disable_mapping() {
        let pipeline = Pipeline::builder()
            .image_dir("/images")
            .no_mapping()
            .threshold(45)
            .build()
            .unwrap();

        assert_eq!(pipeline.config().mapping_path, None);
        assert_eq!(pipeline.config().grouping, GroupingMode::FixedThreshold(45));
    }

    #[test]
    fn pipeline_builder_rejects_bad_search_bounds() {
        let result = Pipeline::builder()
            .image_dir("/images")
            .search(SearchConfig {
                min_threshold_secs: 100,
                max_threshold_secs: 50,
                max_iterations: 20,
            })
            .build();

        assert!(matches!(result, Err(GrouperError::Config(_))));
    }

    #[test]
    fn pipeline_handles_empty_directory() {
        let temp = TempDir::new().unwrap();
        let pipeline = Pipeline::builder()
            .image_dir(temp.path())
            .catalog(temp.path().join("items.json"))
            .build()
            .unwrap();

        let result = pipeline.run().unwrap();

        assert_eq!(result.analysis.images_found, 0);
        assert!(result.applied.catalog.items.is_empty());
        assert!(temp.path().join("items.json").is_file());
    }

    #[test]
    fn analyze_counts_sources_and_groups() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "2025-10-29 12.00.00.jpg");
        touch(temp.path(), "2025-10-29 12.00.20.jpg");
        touch(temp.path(), "2025-10-29 12.05.00.jpg");
        let pipeline = Pipeline::builder()
            .image_dir(temp.path())
            .no_mapping()
            .threshold(60)
            .build()
            .unwrap();

        let analysis = pipeline.analyze(&null_sender()).unwrap();

        assert_eq!(analysis.groups.len(), 2);
        assert_eq!(analysis.sources.get(&TimestampSource::Filename), Some(&3));
        assert!(analysis.choice.is_none());
        assert_eq!(analysis.stats.max_size, 2);
    }

    #[test]
    fn missing_image_dir_is_fatal() {
        let temp = TempDir::new().unwrap();
        let pipeline = Pipeline::builder()
            .image_dir(temp.path().join("nope"))
            .catalog(temp.path().join("items.json"))
            .build()
            .unwrap();

        assert!(matches!(pipeline.run(), Err(GrouperError::Scan(_))));
        assert!(!temp.path().join("items.json").exists());
    }
}
