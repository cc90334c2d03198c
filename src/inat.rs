use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;

use crate::domain::{BoundingBox, TaxonName};
use crate::error::HarvestError;

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationPage {
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub results: Vec<Observation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub observed_on_string: Option<String>,
    #[serde(default)]
    pub taxon: Option<ObservationTaxon>,
    #[serde(default)]
    pub photos: Option<Vec<Photo>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservationTaxon {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

impl Observation {
    pub fn leading_photo(&self) -> Option<&Photo> {
        self.photos.as_ref().and_then(|photos| photos.first())
    }

    pub fn taxon_id(&self) -> Option<u64> {
        self.taxon.as_ref().and_then(|taxon| taxon.id)
    }

    pub fn taxon_name(&self) -> Option<&str> {
        self.taxon.as_ref().and_then(|taxon| taxon.name.as_deref())
    }
}

/// One page of photographed observations for a taxon inside a bounding box.
#[derive(Debug, Clone)]
pub struct ObservationQuery {
    pub taxon_name: TaxonName,
    pub page_size: u32,
    pub bounding_box: BoundingBox,
}

impl ObservationQuery {
    pub fn new(taxon_name: TaxonName, page_size: u32, bounding_box: BoundingBox) -> Self {
        Self {
            taxon_name,
            page_size,
            bounding_box,
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("taxon_name", self.taxon_name.as_str().to_string()),
            ("per_page", self.page_size.to_string()),
            ("media_type", "photo".to_string()),
        ];
        pairs.extend(self.bounding_box.query_pairs());
        pairs
    }
}

pub trait InatClient: Send + Sync {
    /// Returns the first page of results only.
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<ObservationPage, HarvestError>;

    /// Streams an image into `destination`, returning the number of bytes written.
    fn download_image(&self, url: &str, destination: &Path) -> Result<u64, HarvestError>;
}

#[derive(Clone)]
pub struct InatHttpClient {
    client: Client,
    base_url: String,
}

impl InatHttpClient {
    pub fn new(base_url: &str) -> Result<Self, HarvestError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("inat-harvest/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HarvestError::InatHttp(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|err| HarvestError::InatHttp(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn observations_url(&self) -> String {
        format!("{}/observations", self.base_url)
    }
}

/// Writes an image body to `destination`. A non-success status is reported
/// before the file is created.
fn write_image(
    status: StatusCode,
    mut body: impl Read,
    destination: &Path,
) -> Result<u64, HarvestError> {
    if !status.is_success() {
        let mut message = String::new();
        if body.read_to_string(&mut message).is_err() || message.is_empty() {
            message = "image request failed".to_string();
        }
        return Err(HarvestError::ImageStatus {
            status: status.as_u16(),
            message,
        });
    }
    write_body_to_file(body, destination)
}

/// Streams `body` into a new file at `destination`. If reading or writing
/// fails part way, the partial file is removed so a later run retries it.
fn write_body_to_file(mut body: impl Read, destination: &Path) -> Result<u64, HarvestError> {
    let write_err = |err: io::Error| HarvestError::ImageWrite {
        path: destination.display().to_string(),
        message: err.to_string(),
    };
    let mut file = File::create(destination).map_err(write_err)?;
    match io::copy(&mut body, &mut file) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            drop(file);
            let _ = fs::remove_file(destination);
            Err(write_err(err))
        }
    }
}

impl InatClient for InatHttpClient {
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<ObservationPage, HarvestError> {
        let response = self
            .client
            .get(self.observations_url())
            .query(&query.query_pairs())
            .send()
            .map_err(|err| HarvestError::InatHttp(err.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .unwrap_or_else(|_| "iNaturalist request failed".to_string());
            return Err(HarvestError::InatStatus { status, message });
        }
        response
            .json()
            .map_err(|err| HarvestError::InatDecode(err.to_string()))
    }

    fn download_image(&self, url: &str, destination: &Path) -> Result<u64, HarvestError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| HarvestError::ImageHttp(err.to_string()))?;
        let status = response.status();
        write_image(status, response, destination)
    }
}
