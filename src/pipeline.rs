use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::acquire::{Acquisition, ImageAcquirer};
use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::{BoundingBox, TaxonTarget};
use crate::error::HarvestError;
use crate::inat::{InatClient, ObservationQuery};
use crate::layout::CorpusLayout;
use crate::ledger::LedgerStore;

#[derive(Debug, Clone, Default, Serialize)]
pub struct TaxonReport {
    pub taxon: String,
    pub target: usize,
    pub fetched: usize,
    pub total_available: Option<u64>,
    pub acquired: usize,
    pub skipped_existing: usize,
    pub rejected: usize,
    pub failed: usize,
    pub fetch_error: Option<String>,
}

/// Fetches one page of observations for a taxon and acquires images from it
/// in API order until the target count is reached or the page runs out.
pub struct TaxonPipeline<'a, C: InatClient> {
    client: &'a C,
    layout: &'a CorpusLayout,
    ledger: &'a LedgerStore,
    page_size: u32,
    bounding_box: BoundingBox,
    dry_run: bool,
}

impl<'a, C: InatClient> TaxonPipeline<'a, C> {
    pub fn new(
        client: &'a C,
        layout: &'a CorpusLayout,
        ledger: &'a LedgerStore,
        page_size: u32,
        bounding_box: BoundingBox,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            layout,
            ledger,
            page_size,
            bounding_box,
            dry_run,
        }
    }

    pub fn run(
        &self,
        target: &TaxonTarget,
        sink: &dyn ProgressSink,
    ) -> Result<TaxonReport, HarvestError> {
        let taxon = &target.name;
        let started = Instant::now();
        let mut report = TaxonReport {
            taxon: taxon.to_string(),
            target: target.count,
            ..TaxonReport::default()
        };
        info!(taxon = %taxon, target = target.count, "starting taxon");
        sink.event(ProgressEvent {
            message: format!("--- Starting download for taxon: {taxon} ---"),
            elapsed: None,
        });

        if !self.dry_run {
            let dir = self.layout.ensure_taxon_dir(taxon)?;
            sink.event(ProgressEvent {
                message: format!("Using directory: {dir}"),
                elapsed: None,
            });
        }

        let query = ObservationQuery::new(taxon.clone(), self.page_size, self.bounding_box);
        let fetch_started = Instant::now();
        let page = match self.client.fetch_observations(&query) {
            Ok(page) => page,
            Err(err) => {
                warn!(taxon = %taxon, error = %err, "observation query failed");
                sink.event(ProgressEvent {
                    message: format!("Error fetching data from iNaturalist API: {err}"),
                    elapsed: Some(fetch_started.elapsed()),
                });
                report.fetch_error = Some(err.to_string());
                return Ok(report);
            }
        };
        report.fetched = page.results.len();
        report.total_available = page.total_results;
        sink.event(ProgressEvent {
            message: format!("Found {} observations for {taxon}.", page.results.len()),
            elapsed: Some(fetch_started.elapsed()),
        });

        let acquirer = ImageAcquirer::new(self.client, self.layout, self.dry_run);
        let mut tally = Tally::default();
        let accepted = page
            .results
            .iter()
            .map(|observation| acquirer.acquire(observation, taxon))
            .filter(|outcome| tally.observe(outcome, sink))
            .take(target.count);

        for outcome in accepted {
            match outcome {
                Acquisition::Acquired { record, bytes } => {
                    self.ledger.append(&record)?;
                    report.acquired += 1;
                    sink.event(ProgressEvent {
                        message: format!(
                            "  ({}/{}) Downloaded {} ({bytes} bytes)",
                            report.acquired, target.count, record.image_filename
                        ),
                        elapsed: None,
                    });
                }
                Acquisition::Planned {
                    image_filename,
                    url,
                } => {
                    report.acquired += 1;
                    sink.event(ProgressEvent {
                        message: format!(
                            "  ({}/{}) Would download {image_filename} from {url}",
                            report.acquired, target.count
                        ),
                        elapsed: None,
                    });
                }
                _ => {}
            }
        }

        report.skipped_existing = tally.skipped_existing;
        report.rejected = tally.rejected;
        report.failed = tally.failed;
        info!(
            taxon = %taxon,
            acquired = report.acquired,
            skipped = report.skipped_existing,
            failed = report.failed,
            "finished taxon"
        );
        sink.event(ProgressEvent {
            message: format!(
                "--- Finished download for {taxon}. Total downloaded: {} ---",
                report.acquired
            ),
            elapsed: Some(started.elapsed()),
        });
        Ok(report)
    }
}

#[derive(Debug, Default)]
struct Tally {
    skipped_existing: usize,
    rejected: usize,
    failed: usize,
}

impl Tally {
    /// Counts non-yielding outcomes and reports whether `outcome` counts toward the target.
    fn observe(&mut self, outcome: &Acquisition, sink: &dyn ProgressSink) -> bool {
        match outcome {
            Acquisition::AlreadyPresent { .. } => self.skipped_existing += 1,
            Acquisition::Rejected(reason) => {
                self.rejected += 1;
                debug!(reason = reason.as_str(), "observation rejected");
            }
            Acquisition::Failed { url, error } => {
                self.failed += 1;
                sink.event(ProgressEvent {
                    message: format!("  Error downloading image {url}: {error}"),
                    elapsed: None,
                });
            }
            Acquisition::Acquired { .. } | Acquisition::Planned { .. } => {}
        }
        outcome.counts()
    }
}
