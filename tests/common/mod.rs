#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;

use camino::{Utf8Path, Utf8PathBuf};

use inat_harvest::app::{ProgressEvent, ProgressSink};
use inat_harvest::error::HarvestError;
use inat_harvest::inat::{InatClient, Observation, ObservationPage, ObservationQuery, Photo};

#[derive(Default)]
pub struct MockInat {
    pub observations: Vec<Observation>,
    pub fail_query: bool,
    pub fail_urls: HashSet<String>,
    pub queries: Mutex<Vec<Vec<(&'static str, String)>>>,
    pub downloads: Mutex<Vec<String>>,
}

impl MockInat {
    pub fn with_observations(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            ..Self::default()
        }
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }
}

impl InatClient for MockInat {
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<ObservationPage, HarvestError> {
        self.queries.lock().unwrap().push(query.query_pairs());
        if self.fail_query {
            return Err(HarvestError::InatStatus {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(ObservationPage {
            total_results: Some(self.observations.len() as u64),
            results: self.observations.clone(),
        })
    }

    fn download_image(&self, url: &str, destination: &Path) -> Result<u64, HarvestError> {
        self.downloads.lock().unwrap().push(url.to_string());
        if self.fail_urls.contains(url) {
            return Err(HarvestError::ImageHttp("connection reset".to_string()));
        }
        let body = format!("jpeg:{url}");
        std::fs::write(destination, body.as_bytes())
            .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
        Ok(body.len() as u64)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

pub fn square_url(photo_id: u64) -> String {
    format!("https://static.inaturalist.org/photos/{photo_id}/square.jpg")
}

pub fn observation(id: u64, photo_id: u64, location: Option<&str>) -> Observation {
    Observation {
        id: Some(id),
        location: location.map(str::to_string),
        observed_on_string: Some("2024-06-01".to_string()),
        taxon: Some(inat_harvest::inat::ObservationTaxon {
            id: Some(47118),
            name: Some("Araneae".to_string()),
        }),
        photos: Some(vec![Photo {
            id: Some(photo_id),
            url: Some(square_url(photo_id)),
        }]),
    }
}

pub fn utf8_dir(path: &Path) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
}

pub fn ledger_rows(path: &Utf8Path) -> Vec<Vec<String>> {
    let mut reader = csv::Reader::from_path(path.as_std_path()).unwrap();
    reader
        .records()
        .map(|row| row.unwrap().iter().map(str::to_string).collect())
        .collect()
}
