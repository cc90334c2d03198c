use std::fs::{self, OpenOptions};
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::error::HarvestError;

pub const LEDGER_HEADERS: [&str; 7] = [
    "image_filename",
    "observation_id",
    "latitude",
    "longitude",
    "observed_on",
    "taxon_id",
    "taxon_name",
];

/// One row of the metadata ledger. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRecord {
    pub image_filename: String,
    pub observation_id: u64,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub observed_on: Option<String>,
    pub taxon_id: Option<u64>,
    pub taxon_name: Option<String>,
}

/// Append-only CSV ledger. The file is reopened for every append and
/// never rewritten, so rows are only ever added at the end.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: Utf8PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Creates the ledger with its header row. Returns `false` when the
    /// file already existed and was left untouched.
    pub fn ensure_initialized(&self) -> Result<bool, HarvestError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_str().is_empty()) {
            fs::create_dir_all(parent.as_std_path())
                .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
        }
        let file = match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.path.as_std_path())
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(err) => return Err(HarvestError::Ledger(format!("{}: {err}", self.path))),
        };
        let mut writer = csv::Writer::from_writer(file);
        writer
            .write_record(LEDGER_HEADERS)
            .map_err(|err| HarvestError::Ledger(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| HarvestError::Ledger(err.to_string()))?;
        Ok(true)
    }

    pub fn append(&self, record: &LedgerRecord) -> Result<(), HarvestError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_std_path())
            .map_err(|err| HarvestError::Ledger(format!("{}: {err}", self.path)))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer
            .serialize(record)
            .map_err(|err| HarvestError::Ledger(err.to_string()))?;
        writer
            .flush()
            .map_err(|err| HarvestError::Ledger(err.to_string()))?;
        Ok(())
    }
}
