//! Carry out a rename plan: mapping first, then files, then the catalog.

use super::executor::PipelineConfig;
use crate::core::catalog::{Catalog, CatalogStore, ProvenanceMapping};
use crate::core::rename::{
    build_catalog, carry_over_edits, final_name, RenameExecutor, RenamePlan, RenameReport,
};
use crate::error::Result;
use crate::events::{Event, EventSender, PipelineEvent, PipelinePhase};
use serde::Serialize;

/// What a plan turned into
#[derive(Debug, Clone, Serialize)]
pub struct AppliedPlan {
    pub plan: RenamePlan,
    pub report: RenameReport,
    pub catalog: Catalog,
    /// Entries in the mapping after the run (or that would be, on a dry run)
    pub mapping_entries: usize,
    pub dry_run: bool,
}

/// Preflight, write the mapping, rename, rewrite the mapping, write the catalog.
///
/// An existing catalog that cannot be read or parsed aborts before anything
/// is touched. A failure to write the mapping before renaming aborts with
/// nothing renamed. A failure to write the catalog afterwards aborts too; the
/// mapping on disk then describes the renames that did happen.
pub(crate) fn apply_plan(
    plan: RenamePlan,
    config: &PipelineConfig,
    previous: &ProvenanceMapping,
    events: &EventSender,
) -> Result<AppliedPlan> {
    let executor = RenameExecutor::new(&config.image_dir);
    let store = CatalogStore::new(&config.catalog_path);
    let existing = store.load_or_default()?;
    let preflight = executor.preflight(&plan.requests());

    let expected = plan.provenance(previous, |p| preflight.expected_name(&p.source_name));

    if config.dry_run {
        let report = RenameReport::preview(&preflight);
        let mut catalog = build_catalog(&plan, &report, &config.item_defaults);
        carry_over_edits(&mut catalog, existing, &plan, previous);
        return Ok(AppliedPlan {
            mapping_entries: expected.len(),
            plan,
            report,
            catalog,
            dry_run: true,
        });
    }

    if let Some(path) = &config.mapping_path {
        expected.save(path)?;
        tracing::info!(entries = expected.len(), path = %path.display(), "mapping written");
    }

    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::Renaming,
    }));
    let report = executor.execute(&preflight, events);
    tracing::info!(
        renamed = report.renamed_count(),
        collisions = report.collisions().count(),
        failed = report.failures().count(),
        "renames done"
    );

    let finals = report.final_names();
    let actual = plan.provenance(previous, |p| final_name(p, &finals));
    if let Some(path) = &config.mapping_path {
        if actual != expected {
            actual.save(path)?;
        }
    }

    events.send(Event::Pipeline(PipelineEvent::PhaseChanged {
        phase: PipelinePhase::WritingCatalog,
    }));
    let mut catalog = build_catalog(&plan, &report, &config.item_defaults);
    let carried = carry_over_edits(&mut catalog, existing, &plan, previous);
    store.save(&catalog)?;
    tracing::info!(
        items = catalog.items.len(),
        carried,
        path = %store.path().display(),
        "catalog written"
    );

    Ok(AppliedPlan {
        mapping_entries: actual.len(),
        plan,
        report,
        catalog,
        dry_run: false,
    })
}
