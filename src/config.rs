use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::domain::{BoundingBox, TaxonName, TaxonTarget};
use crate::error::HarvestError;

pub const DEFAULT_CONFIG_FILE: &str = "inat-harvest.json";
pub const DEFAULT_DATA_ROOT: &str = "data";
pub const DEFAULT_METADATA_FILE: &str = "metadata.csv";
pub const DEFAULT_API_BASE_URL: &str = "https://api.inaturalist.org/v1";
pub const MAX_PAGE_SIZE: u32 = 200;
pub const DEFAULT_IMAGES_PER_TAXON: usize = 1000;
pub const DEFAULT_TAXA: &[&str] = &[
    "Ephemeroptera",
    "Plecoptera",
    "Trichoptera",
    "Coleoptera",
    "Araneae",
];
pub const DEFAULT_BOUNDING_BOX: BoundingBox = BoundingBox {
    swlat: 0.0,
    swlng: -155.0,
    nelat: 60.0,
    nelng: -40.0,
};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub data_root: Option<String>,
    #[serde(default)]
    pub metadata_file: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub images_per_taxon: Option<usize>,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
    #[serde(default)]
    pub taxa: Option<Vec<TaxonEntry>>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TaxonEntry {
    Shorthand(String),
    Detailed(TaxonEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TaxonEntryObject {
    pub name: String,
    #[serde(default)]
    pub count: Option<usize>,
}

/// Immutable settings for one harvest run.
#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub data_root: Utf8PathBuf,
    pub metadata_path: Utf8PathBuf,
    pub api_base_url: String,
    pub page_size: u32,
    pub bounding_box: BoundingBox,
    pub taxa: Vec<TaxonTarget>,
}

impl HarvestConfig {
    /// The built-in settings. Fails rather than dropping a built-in taxon
    /// name that does not validate.
    pub fn builtin() -> Result<Self, HarvestError> {
        let taxa = DEFAULT_TAXA
            .iter()
            .map(|name| {
                Ok(TaxonTarget {
                    name: name.parse::<TaxonName>()?,
                    count: DEFAULT_IMAGES_PER_TAXON,
                })
            })
            .collect::<Result<Vec<_>, HarvestError>>()?;
        Ok(Self {
            data_root: Utf8PathBuf::from(DEFAULT_DATA_ROOT),
            metadata_path: Utf8PathBuf::from(DEFAULT_METADATA_FILE),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            page_size: MAX_PAGE_SIZE,
            bounding_box: DEFAULT_BOUNDING_BOX,
            taxa,
        })
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads an explicit config path, or `inat-harvest.json` when present.
    /// Without either, the built-in defaults are used.
    pub fn resolve(path: Option<&str>) -> Result<HarvestConfig, HarvestError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| HarvestError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| HarvestError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<HarvestConfig, HarvestError> {
        let defaults = HarvestConfig::builtin()?;

        let page_size = config.page_size.unwrap_or(defaults.page_size);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(HarvestError::InvalidPageSize(page_size));
        }

        let bounding_box = config.bounding_box.unwrap_or(defaults.bounding_box);
        bounding_box.validate()?;

        let images_per_taxon = config
            .images_per_taxon
            .unwrap_or(DEFAULT_IMAGES_PER_TAXON);
        let taxa = match config.taxa {
            Some(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    TaxonEntry::Shorthand(value) => Ok(TaxonTarget {
                        name: value.parse()?,
                        count: images_per_taxon,
                    }),
                    TaxonEntry::Detailed(obj) => Ok(TaxonTarget {
                        name: obj.name.parse()?,
                        count: obj.count.unwrap_or(images_per_taxon),
                    }),
                })
                .collect::<Result<Vec<_>, HarvestError>>()?,
            None => defaults
                .taxa
                .into_iter()
                .map(|target| TaxonTarget {
                    count: images_per_taxon,
                    ..target
                })
                .collect(),
        };

        Ok(HarvestConfig {
            data_root: config
                .data_root
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.data_root),
            metadata_path: config
                .metadata_file
                .map(Utf8PathBuf::from)
                .unwrap_or(defaults.metadata_path),
            api_base_url: config
                .api_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            page_size,
            bounding_box,
            taxa,
        })
    }
}
