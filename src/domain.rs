use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

/// Taxon label used both as the API query and as the corpus subdirectory name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaxonName(String);

impl TaxonName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaxonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxonName {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty()
            && normalized != "."
            && normalized != ".."
            && normalized
                .chars()
                .all(|ch| !ch.is_control() && ch != '/' && ch != '\\');
        if !is_valid {
            return Err(HarvestError::InvalidTaxonName(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

impl TryFrom<String> for TaxonName {
    type Error = HarvestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TaxonName> for String {
    fn from(value: TaxonName) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonTarget {
    pub name: TaxonName,
    pub count: usize,
}

/// Geographic query window, south-west and north-east corners in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub swlat: f64,
    pub swlng: f64,
    pub nelat: f64,
    pub nelng: f64,
}

impl BoundingBox {
    pub fn validate(&self) -> Result<(), HarvestError> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lng_ok = |v: f64| (-180.0..=180.0).contains(&v);
        if !(lat_ok(self.swlat) && lat_ok(self.nelat)) {
            return Err(HarvestError::InvalidBoundingBox(
                "latitude out of range".to_string(),
            ));
        }
        if !(lng_ok(self.swlng) && lng_ok(self.nelng)) {
            return Err(HarvestError::InvalidBoundingBox(
                "longitude out of range".to_string(),
            ));
        }
        if self.swlat >= self.nelat || self.swlng >= self.nelng {
            return Err(HarvestError::InvalidBoundingBox(format!(
                "south-west corner ({}, {}) must lie below and left of north-east corner ({}, {})",
                self.swlat, self.swlng, self.nelat, self.nelng
            )));
        }
        Ok(())
    }

    /// Query parameters in the order the observations endpoint documents them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("swlat", self.swlat.to_string()),
            ("swlng", self.swlng.to_string()),
            ("nelat", self.nelat.to_string()),
            ("nelng", self.nelng.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_taxon_name_trims() {
        let name: TaxonName = "  Araneae ".parse().unwrap();
        assert_eq!(name.as_str(), "Araneae");
    }

    #[test]
    fn parse_taxon_name_rejects_separators() {
        let err = "../etc".parse::<TaxonName>().unwrap_err();
        assert_matches!(err, HarvestError::InvalidTaxonName(_));
        let err = "".parse::<TaxonName>().unwrap_err();
        assert_matches!(err, HarvestError::InvalidTaxonName(_));
    }

    #[test]
    fn bounding_box_rejects_inverted_corners() {
        let bbox = BoundingBox {
            swlat: 60.0,
            swlng: -155.0,
            nelat: 0.0,
            nelng: -40.0,
        };
        assert_matches!(bbox.validate(), Err(HarvestError::InvalidBoundingBox(_)));
    }
}
