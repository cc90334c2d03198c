mod common;

use inat_harvest::app::{App, RunOptions};
use inat_harvest::config::{ConfigLoader, Config, TaxonEntry, TaxonEntryObject};
use inat_harvest::ledger::LEDGER_HEADERS;

use common::{MockInat, RecordingSink, ledger_rows, observation, utf8_dir};

fn config_in(root: &camino::Utf8Path, taxa: Vec<TaxonEntry>) -> inat_harvest::config::HarvestConfig {
    ConfigLoader::resolve_config(Config {
        data_root: Some(root.join("data").to_string()),
        metadata_file: Some(root.join("metadata.csv").to_string()),
        taxa: Some(taxa),
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn run_processes_taxa_in_configured_order() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_dir(temp.path());
    let config = config_in(
        &root,
        vec![
            TaxonEntry::Detailed(TaxonEntryObject {
                name: "Plecoptera".to_string(),
                count: Some(1),
            }),
            TaxonEntry::Shorthand("Araneae".to_string()),
        ],
    );
    let client = MockInat::with_observations(vec![observation(1, 10, None), observation(2, 20, None)]);
    let app = App::new(config, client);

    let summary = app.run(RunOptions::default(), &RecordingSink::default()).unwrap();

    assert_eq!(summary.taxa.len(), 2);
    assert_eq!(summary.taxa[0].taxon, "Plecoptera");
    assert_eq!(summary.taxa[0].acquired, 1);
    assert_eq!(summary.taxa[1].acquired, 2);
    assert_eq!(summary.total_acquired, 3);

    let rows = ledger_rows(app.ledger().path());
    let files = rows.iter().map(|row| row[0].as_str()).collect::<Vec<_>>();
    assert_eq!(
        files,
        vec![
            "Plecoptera/Plecoptera_1_10.jpg",
            "Araneae/Araneae_1_10.jpg",
            "Araneae/Araneae_2_20.jpg",
        ]
    );
}

#[test]
fn rerun_keeps_single_header_and_skips_existing_images() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_dir(temp.path());
    let config = config_in(&root, vec![TaxonEntry::Shorthand("Araneae".to_string())]);
    let app = App::new(config, MockInat::with_observations(vec![observation(7, 70, Some("45.0,-70.0"))]));

    app.run(RunOptions::default(), &RecordingSink::default()).unwrap();
    let second = app.run(RunOptions::default(), &RecordingSink::default()).unwrap();

    assert_eq!(second.total_acquired, 0);
    assert_eq!(second.taxa[0].skipped_existing, 1);

    let content = std::fs::read_to_string(app.ledger().path().as_std_path()).unwrap();
    let headers = content
        .lines()
        .filter(|line| *line == LEDGER_HEADERS.join(","))
        .count();
    assert_eq!(headers, 1);
    assert_eq!(ledger_rows(app.ledger().path()).len(), 1);

    let taxon_dirs = std::fs::read_dir(app.layout().root().as_std_path()).unwrap().count();
    assert_eq!(taxon_dirs, 1);
}

#[test]
fn fetch_failure_does_not_abort_the_run() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_dir(temp.path());
    let config = config_in(
        &root,
        vec![
            TaxonEntry::Shorthand("Coleoptera".to_string()),
            TaxonEntry::Shorthand("Araneae".to_string()),
        ],
    );
    let client = MockInat {
        fail_query: true,
        ..MockInat::default()
    };
    let app = App::new(config, client);

    let summary = app.run(RunOptions::default(), &RecordingSink::default()).unwrap();

    assert_eq!(summary.taxa.len(), 2);
    assert!(summary.taxa.iter().all(|report| report.fetch_error.is_some()));
    assert_eq!(summary.total_acquired, 0);
    assert!(app.ledger().path().exists());
}

#[test]
fn dry_run_leaves_filesystem_untouched() {
    let temp = tempfile::tempdir().unwrap();
    let root = utf8_dir(temp.path());
    let config = config_in(&root, vec![TaxonEntry::Shorthand("Araneae".to_string())]);
    let app = App::new(config, MockInat::with_observations(vec![observation(1, 2, None)]));

    let summary = app
        .run(RunOptions { dry_run: true }, &RecordingSink::default())
        .unwrap();

    assert!(summary.dry_run);
    assert_eq!(summary.total_acquired, 1);
    assert!(!app.layout().root().exists());
    assert!(!app.ledger().path().exists());
}
