use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::config::HarvestConfig;
use crate::domain::TaxonTarget;
use crate::error::HarvestError;
use crate::inat::InatClient;
use crate::layout::CorpusLayout;
use crate::ledger::LedgerStore;
use crate::pipeline::{TaxonPipeline, TaxonReport};

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub started_at: String,
    pub finished_at: String,
    pub dry_run: bool,
    pub data_root: String,
    pub metadata_file: String,
    pub taxa: Vec<TaxonReport>,
    pub total_acquired: usize,
    pub total_failed: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

/// Runs the configured taxa one after another against a single corpus and ledger.
pub struct App<C: InatClient> {
    config: HarvestConfig,
    client: C,
    layout: CorpusLayout,
    ledger: LedgerStore,
}

impl<C: InatClient> App<C> {
    pub fn new(config: HarvestConfig, client: C) -> Self {
        let layout = CorpusLayout::new(config.data_root.clone());
        let ledger = LedgerStore::new(config.metadata_path.clone());
        Self {
            config,
            client,
            layout,
            ledger,
        }
    }

    pub fn layout(&self) -> &CorpusLayout {
        &self.layout
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    /// Runs every configured taxon target in order.
    pub fn run(
        &self,
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, HarvestError> {
        self.run_all(&self.config.taxa, options, sink)
    }

    pub fn run_all(
        &self,
        targets: &[TaxonTarget],
        options: RunOptions,
        sink: &dyn ProgressSink,
    ) -> Result<RunSummary, HarvestError> {
        let started_at = iso_timestamp();
        sink.event(ProgressEvent {
            message: "=== Starting iNaturalist Image Downloader ===".to_string(),
            elapsed: None,
        });

        if !options.dry_run {
            self.setup_environment(sink)?;
        }

        let pipeline = TaxonPipeline::new(
            &self.client,
            &self.layout,
            &self.ledger,
            self.config.page_size,
            self.config.bounding_box,
            options.dry_run,
        );

        let mut taxa = Vec::with_capacity(targets.len());
        for target in targets {
            taxa.push(pipeline.run(target, sink)?);
        }

        let total_acquired: usize = taxa.iter().map(|report| report.acquired).sum();
        let total_failed: usize = taxa.iter().map(|report| report.failed).sum();
        info!(
            taxa = taxa.len(),
            total_acquired, total_failed, "harvest complete"
        );
        sink.event(ProgressEvent {
            message: "=== All downloads complete. ===".to_string(),
            elapsed: None,
        });

        Ok(RunSummary {
            started_at,
            finished_at: iso_timestamp(),
            dry_run: options.dry_run,
            data_root: self.layout.root().to_string(),
            metadata_file: self.ledger.path().to_string(),
            taxa,
            total_acquired,
            total_failed,
        })
    }

    fn setup_environment(&self, sink: &dyn ProgressSink) -> Result<(), HarvestError> {
        let root_existed = self.layout.root().as_std_path().exists();
        self.layout.ensure_root()?;
        if !root_existed {
            sink.event(ProgressEvent {
                message: format!("Created base directory: {}", self.layout.root()),
                elapsed: None,
            });
        }
        if self.ledger.ensure_initialized()? {
            sink.event(ProgressEvent {
                message: format!("Created metadata file: {}", self.ledger.path()),
                elapsed: None,
            });
        }
        Ok(())
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
