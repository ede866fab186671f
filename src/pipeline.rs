//! fetch → parse → diff → format for one batch run.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use futures::future::join_all;
use tracing::{info, warn};

use crate::catalog::{Catalog, ProgramId, Variant};
use crate::output::{render_report, write_message, RenderOptions, ReportFormat};
use crate::parser::{parse, ParseError, ParsedPage};
use crate::portal::RatingSource;
use crate::report::CampaignReport;
use crate::snapshot::SnapshotStore;
use crate::types::RecordSet;

/// Result of polling every catalog program once.
#[derive(Debug, Clone, Default)]
pub struct CollectedRecords {
    pub records: RecordSet,
    pub failures: Vec<(ProgramId, String)>,
    /// Programs whose rating table listed fewer agreed rows than seats.
    pub below_quota: Vec<ProgramId>,
}

/// Fetches and parses every program of the catalog, one task per program,
/// and waits for all of them. A failure only affects its own program.
pub async fn collect_records(
    source: Arc<dyn RatingSource>,
    catalog: &Catalog,
    variant: Variant,
) -> CollectedRecords {
    let programs = catalog.programs().collect::<Vec<_>>();
    let handles = programs
        .iter()
        .map(|program| {
            let source = Arc::clone(&source);
            let program = *program;
            tokio::spawn(async move {
                let fetched = source.fetch(program).await;
                parse(&fetched, variant)
            })
        })
        .collect::<Vec<_>>();

    let mut collected = CollectedRecords::default();
    for (program, joined) in programs.into_iter().zip(join_all(handles).await) {
        let outcome: Result<ParsedPage, String> = match joined {
            Ok(parsed) => parsed.map_err(|e: ParseError| e.to_string()),
            Err(join_err) => Err(format!("task failed: {join_err}")),
        };
        match outcome {
            Ok(page) => {
                if page.below_quota {
                    collected.below_quota.push(program);
                }
                if let Err(err) = collected.records.insert(page.record) {
                    warn!("{err}");
                }
            }
            Err(reason) => {
                warn!("{program}: {reason}");
                collected.failures.push((program, reason));
            }
        }
    }
    info!(
        "parsed {} of {} programs",
        collected.records.len(),
        catalog.len()
    );
    collected
}

/// Snapshot to persist: this run's records, plus the previous record of every
/// program that failed so its baseline survives until the next good run.
pub fn next_snapshot(collected: &CollectedRecords, previous: Option<&RecordSet>) -> RecordSet {
    let mut next = collected.records.clone();
    if let Some(previous) = previous {
        for (program, _) in &collected.failures {
            let Some(record) = previous.get(*program) else {
                continue;
            };
            if let Err(err) = next.insert(record.clone()) {
                warn!("keeping fresh record over baseline: {err}");
            }
        }
    }
    next.with_captured_at(Utc::now())
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub variant: Variant,
    pub format: ReportFormat,
    pub options: RenderOptions,
    pub message_path: std::path::PathBuf,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: CampaignReport,
    pub message: String,
}

/// One complete batch run: load the baseline, poll, render, then persist the
/// message and the new snapshot. Only write failures are fatal.
pub async fn run_campaign(
    source: Arc<dyn RatingSource>,
    catalog: &Catalog,
    store: &SnapshotStore,
    settings: &RunSettings,
) -> Result<RunOutcome> {
    let previous = store.load();
    if let Some(at) = previous.as_ref().and_then(|p| p.captured_at) {
        info!("baseline captured at {}", at.to_rfc3339());
    }

    let collected = collect_records(source, catalog, settings.variant).await;
    let report = CampaignReport::build(
        catalog,
        settings.variant,
        &collected.records,
        previous.as_ref(),
        &collected.failures,
    );
    let message = render_report(&report, settings.format, &settings.options)?;

    write_message(&settings.message_path, &message)?;
    store.save(&next_snapshot(&collected, previous.as_ref()))?;
    info!(
        "{} programs changed since last run, {} failed",
        report.changed_count(),
        report.failures.len()
    );

    Ok(RunOutcome { report, message })
}
