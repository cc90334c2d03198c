use tracing::{debug, warn};

use crate::domain::TaxonName;
use crate::error::HarvestError;
use crate::inat::{InatClient, Observation};
use crate::layout::CorpusLayout;
use crate::ledger::LedgerRecord;

/// Size marker embedded in photo URLs returned by the API.
pub const SOURCE_SIZE_TOKEN: &str = "square";
/// Size marker substituted in before downloading.
pub const DOWNLOAD_SIZE_TOKEN: &str = "large";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoPhotos,
    MissingUrl,
    MissingPhotoId,
    MissingObservationId,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::NoPhotos => "no photos",
            RejectReason::MissingUrl => "leading photo has no url",
            RejectReason::MissingPhotoId => "leading photo has no id",
            RejectReason::MissingObservationId => "observation has no id",
        }
    }
}

/// Result of handling one observation. Only `Acquired` yields a ledger row.
#[derive(Debug)]
pub enum Acquisition {
    Acquired { record: LedgerRecord, bytes: u64 },
    Planned { image_filename: String, url: String },
    AlreadyPresent { image_filename: String },
    Rejected(RejectReason),
    Failed { url: String, error: HarvestError },
}

impl Acquisition {
    /// Whether this outcome counts toward a taxon's target.
    pub fn counts(&self) -> bool {
        matches!(self, Acquisition::Acquired { .. } | Acquisition::Planned { .. })
    }
}

pub struct ImageAcquirer<'a, C: InatClient> {
    client: &'a C,
    layout: &'a CorpusLayout,
    dry_run: bool,
}

impl<'a, C: InatClient> ImageAcquirer<'a, C> {
    pub fn new(client: &'a C, layout: &'a CorpusLayout, dry_run: bool) -> Self {
        Self {
            client,
            layout,
            dry_run,
        }
    }

    pub fn acquire(&self, observation: &Observation, taxon: &TaxonName) -> Acquisition {
        let Some(photo) = observation.leading_photo() else {
            return Acquisition::Rejected(RejectReason::NoPhotos);
        };
        let Some(source_url) = photo.url.as_deref().filter(|url| !url.is_empty()) else {
            return Acquisition::Rejected(RejectReason::MissingUrl);
        };
        let Some(photo_id) = photo.id else {
            return Acquisition::Rejected(RejectReason::MissingPhotoId);
        };
        let Some(observation_id) = observation.id else {
            return Acquisition::Rejected(RejectReason::MissingObservationId);
        };

        let url = upgrade_photo_url(source_url);
        let image_filename = CorpusLayout::image_path(taxon, observation_id, photo_id);
        let path = self.layout.resolve(&image_filename);
        if self.layout.exists(&path) {
            debug!(image = %image_filename, "image already present, skipping");
            return Acquisition::AlreadyPresent { image_filename };
        }

        if self.dry_run {
            return Acquisition::Planned {
                image_filename,
                url,
            };
        }

        let bytes = match self.client.download_image(&url, path.as_std_path()) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(observation = observation_id, url = %url, error = %error, "image download failed");
                return Acquisition::Failed { url, error };
            }
        };

        let (latitude, longitude) = match observation.location.as_deref() {
            None => (None, None),
            Some(raw) if raw.trim().is_empty() => (None, None),
            Some(raw) => match split_location(raw) {
                Some((lat, lon)) => (Some(lat), Some(lon)),
                None => {
                    warn!(
                        observation = observation_id,
                        location = raw,
                        "malformed location, recording without coordinates"
                    );
                    (None, None)
                }
            },
        };

        Acquisition::Acquired {
            record: LedgerRecord {
                image_filename,
                observation_id,
                latitude,
                longitude,
                observed_on: observation.observed_on_string.clone(),
                taxon_id: observation.taxon_id(),
                taxon_name: observation.taxon_name().map(str::to_string),
            },
            bytes,
        }
    }
}

pub fn upgrade_photo_url(url: &str) -> String {
    url.replace(SOURCE_SIZE_TOKEN, DOWNLOAD_SIZE_TOKEN)
}

/// Splits `"lat,lon"` on the first comma. Both halves are kept verbatim.
pub fn split_location(raw: &str) -> Option<(String, String)> {
    let (lat, lon) = raw.split_once(',')?;
    if lat.trim().is_empty() || lon.trim().is_empty() {
        return None;
    }
    Some((lat.to_string(), lon.to_string()))
}
