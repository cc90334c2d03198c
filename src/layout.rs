use std::fs;

use camino::{Utf8Path, Utf8PathBuf};

use crate::domain::TaxonName;
use crate::error::HarvestError;

/// On-disk corpus convention: `<root>/<taxon>/<taxon>_<observation>_<photo>.jpg`.
#[derive(Debug, Clone)]
pub struct CorpusLayout {
    root: Utf8PathBuf,
}

impl CorpusLayout {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn taxon_dir(&self, taxon: &TaxonName) -> Utf8PathBuf {
        self.root.join(taxon.as_str())
    }

    pub fn ensure_root(&self) -> Result<(), HarvestError> {
        fs::create_dir_all(self.root.as_std_path())
            .map_err(|err| HarvestError::Filesystem(format!("{}: {err}", self.root)))
    }

    pub fn ensure_taxon_dir(&self, taxon: &TaxonName) -> Result<Utf8PathBuf, HarvestError> {
        let dir = self.taxon_dir(taxon);
        fs::create_dir_all(dir.as_std_path())
            .map_err(|err| HarvestError::Filesystem(format!("{dir}: {err}")))?;
        Ok(dir)
    }

    /// Ledger key for an image, relative to the corpus root.
    pub fn image_path(taxon: &TaxonName, observation_id: u64, photo_id: u64) -> String {
        format!(
            "{taxon}/{taxon}_{observation_id}_{photo_id}.jpg",
            taxon = taxon.as_str()
        )
    }

    pub fn resolve(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    pub fn exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().exists()
    }
}
