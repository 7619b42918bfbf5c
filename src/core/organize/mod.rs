//! Photo and video organization.
//!
//! A run goes scan → structure → transfer → reports. [`Organizer`] drives it
//! for both layouts; the individual steps are public for callers that want
//! to stop in between (for example to preview a [`StructureLayout`]).

mod executor;
pub mod structure;
mod types;

pub use executor::TransferExecutor;
pub(crate) use executor::move_file;
pub use structure::{build_date_structure, build_type_structure, category_dir};
pub use types::*;

use crate::core::bucket::{BucketPlan, Granularity};
use crate::core::config::OrganizerConfig;
use crate::core::reporter::{self, RunManifest};
use crate::core::scanner::{self, ProjectKind};
use crate::error::Result;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use chrono::Local;
use std::path::Path;
use std::time::Instant;

/// Runs organization jobs against one configuration
pub struct Organizer<'a> {
    config: &'a OrganizerConfig,
}

impl<'a> Organizer<'a> {
    pub fn new(config: &'a OrganizerConfig) -> Self {
        Self { config }
    }

    /// Sort `source` into `img/jpg`, `img/raw` and `videos` below `dest`
    pub fn organize_by_type(
        &self,
        source: &Path,
        dest: &Path,
        options: &OrganizeOptions,
    ) -> Result<OrganizeOutcome> {
        self.organize_by_type_with_events(source, dest, options, &null_sender())
    }

    pub fn organize_by_type_with_events(
        &self,
        source: &Path,
        dest: &Path,
        options: &OrganizeOptions,
        events: &EventSender,
    ) -> Result<OrganizeOutcome> {
        let start = Instant::now();
        events.send(Event::Scan(ScanEvent::Started {
            path: source.to_path_buf(),
        }));

        let analysis = scanner::scan_by_type(source, &self.config.extensions)?;
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: analysis.total(),
        }));

        let kind = analysis.project_kind();
        if kind == ProjectKind::Empty {
            tracing::info!(source = %source.display(), "no media files, nothing to do");
            return Ok(OrganizeOutcome::NothingToDo);
        }

        let layout = build_type_structure(dest, &analysis, options.create_all)?;
        if options.include_readme {
            reporter::write_category_readmes(&layout, &self.config.readme)?;
        }

        let executor = TransferExecutor::new(options.operation, options.conflict);
        let entries = executor.execute_typed(source, &analysis, &layout, events)?;

        let now = Local::now().naive_local();
        let log_path = reporter::write_log(dest, &entries, now)?;
        let manifest = RunManifest::for_type_run(&analysis, source, dest, now);
        let manifest_path = reporter::write_manifest(dest, &manifest)?;

        tracing::info!(
            kind = %kind,
            files = entries.len(),
            dest = %dest.display(),
            "organized by type"
        );

        Ok(OrganizeOutcome::Completed(RunSummary {
            mode: OrganizeMode::ByType,
            project_kind: Some(kind),
            entries,
            folders_created: layout.created,
            excluded: 0,
            log_path,
            manifest_path,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }

    /// Sort `source` into one folder per calendar bucket below `dest`
    pub fn organize_by_date(
        &self,
        source: &Path,
        dest: &Path,
        granularity: Granularity,
        options: &OrganizeOptions,
    ) -> Result<OrganizeOutcome> {
        self.organize_by_date_with_events(source, dest, granularity, options, &null_sender())
    }

    pub fn organize_by_date_with_events(
        &self,
        source: &Path,
        dest: &Path,
        granularity: Granularity,
        options: &OrganizeOptions,
        events: &EventSender,
    ) -> Result<OrganizeOutcome> {
        let start = Instant::now();
        events.send(Event::Scan(ScanEvent::Started {
            path: source.to_path_buf(),
        }));

        let scan = scanner::scan_by_date(source, &self.config.extensions)?;
        events.send(Event::Scan(ScanEvent::Completed {
            total_files: scan.total(),
        }));

        if scan.total() == 0 {
            tracing::info!(source = %source.display(), excluded = scan.excluded, "no media files, nothing to do");
            return Ok(OrganizeOutcome::NothingToDo);
        }

        let plan = BucketPlan::build(&scan.index, granularity);
        let layout = build_date_structure(dest, &plan)?;
        if options.include_readme {
            reporter::write_bucket_readmes(&layout, &self.config.readme)?;
        }

        let executor = TransferExecutor::new(options.operation, options.conflict);
        let entries = executor.execute_dated(source, &plan, &layout, events)?;

        let now = Local::now().naive_local();
        let log_path = reporter::write_log(dest, &entries, now)?;
        let manifest = RunManifest::for_date_run(&plan, source, dest, now);
        let manifest_path = reporter::write_manifest(dest, &manifest)?;

        tracing::info!(
            %granularity,
            files = entries.len(),
            buckets = layout.targets.len(),
            dest = %dest.display(),
            "organized by date"
        );

        Ok(OrganizeOutcome::Completed(RunSummary {
            mode: OrganizeMode::ByDate(granularity),
            project_kind: None,
            entries,
            folders_created: layout.created,
            excluded: scan.excluded,
            log_path,
            manifest_path,
            duration_ms: start.elapsed().as_millis() as u64,
        }))
    }
}
