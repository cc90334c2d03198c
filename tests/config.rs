use assert_matches::assert_matches;

use inat_harvest::config::{Config, ConfigLoader, DEFAULT_BOUNDING_BOX, TaxonEntry};
use inat_harvest::domain::BoundingBox;
use inat_harvest::error::HarvestError;

#[test]
fn parse_json_config_with_mixed_taxa() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("inat-harvest.json");
    std::fs::write(
        &path,
        r#"{
            "data_root": "corpus",
            "images_per_taxon": 50,
            "taxa": ["Araneae", {"name": "Plecoptera", "count": 5}]
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.data_root, "corpus");
    assert_eq!(resolved.metadata_path, "metadata.csv");
    assert_eq!(resolved.page_size, 200);
    assert_eq!(resolved.bounding_box, DEFAULT_BOUNDING_BOX);
    assert_eq!(resolved.taxa.len(), 2);
    assert_eq!(resolved.taxa[0].count, 50);
    assert_eq!(resolved.taxa[1].name.as_str(), "Plecoptera");
    assert_eq!(resolved.taxa[1].count, 5);
}

#[test]
fn missing_explicit_config_is_an_error() {
    let err = ConfigLoader::resolve(Some("/nonexistent/inat-harvest.json")).unwrap_err();
    assert_matches!(err, HarvestError::ConfigRead(_));
    assert!(err.is_config());
}

#[test]
fn page_size_above_api_maximum_is_rejected() {
    let config = Config {
        page_size: Some(500),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(config),
        Err(HarvestError::InvalidPageSize(500))
    );
}

#[test]
fn invalid_taxon_name_is_rejected() {
    let config = Config {
        taxa: Some(vec![TaxonEntry::Shorthand("a/b".to_string())]),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(config),
        Err(HarvestError::InvalidTaxonName(_))
    );
}

#[test]
fn out_of_range_bounding_box_is_rejected() {
    let config = Config {
        bounding_box: Some(BoundingBox {
            swlat: -95.0,
            swlng: -155.0,
            nelat: 60.0,
            nelng: -40.0,
        }),
        ..Config::default()
    };
    assert_matches!(
        ConfigLoader::resolve_config(config),
        Err(HarvestError::InvalidBoundingBox(_))
    );
}
