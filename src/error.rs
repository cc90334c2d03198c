use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarvestError {
    #[error("invalid taxon name: {0:?}")]
    InvalidTaxonName(String),

    #[error("invalid page size {0}: must be between 1 and 200")]
    InvalidPageSize(u32),

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("iNaturalist request failed: {0}")]
    InatHttp(String),

    #[error("iNaturalist returned status {status}: {message}")]
    InatStatus { status: u16, message: String },

    #[error("failed to decode iNaturalist response: {0}")]
    InatDecode(String),

    #[error("image request failed: {0}")]
    ImageHttp(String),

    #[error("image server returned status {status}: {message}")]
    ImageStatus { status: u16, message: String },

    #[error("failed to write image {path}: {message}")]
    ImageWrite { path: String, message: String },

    #[error("metadata ledger error: {0}")]
    Ledger(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl HarvestError {
    /// Errors raised while resolving configuration, before any work starts.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            HarvestError::InvalidTaxonName(_)
                | HarvestError::InvalidPageSize(_)
                | HarvestError::InvalidBoundingBox(_)
                | HarvestError::ConfigRead(_)
                | HarvestError::ConfigParse(_)
        )
    }
}
