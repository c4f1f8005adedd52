mod common;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use common::{MockApi, MockBrowser, Reply, etf_payload, fund_payload, ids, record};
use fund_catalog::app::App;
use fund_catalog::config::{DiscoverySettings, Mode};
use fund_catalog::domain::InstrumentKind;
use fund_catalog::error::CatalogError;
use fund_catalog::output::JsonOutput;
use fund_catalog::store::Store;

fn temp_store() -> (tempfile::TempDir, Store) {
    let temp = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap();
    (temp, Store::in_dir(&root))
}

fn listing_browser() -> MockBrowser {
    MockBrowser {
        listing: vec![
            "https://info.tase.co.il/Fund.aspx?ObjectID=0001".to_string(),
            "https://info.tase.co.il/Fund.aspx?ObjectID=045".to_string(),
            "https://info.tase.co.il/Fund.aspx?ObjectID=200".to_string(),
        ],
        ..MockBrowser::default()
    }
}

fn api() -> MockApi {
    MockApi::default()
        .with(InstrumentKind::Fund, "001", Reply::Found(fund_payload("001", 0.8, 0.1)))
        .with(InstrumentKind::Fund, "045", Reply::NotFound)
        .with(
            InstrumentKind::Etf,
            "045",
            Reply::Found(etf_payload("045", 0.25, 0.05, 0.0)),
        )
        .with(InstrumentKind::Fund, "200", Reply::Status(500))
}

#[test]
fn full_run_writes_all_three_artifacts() {
    let (_temp, store) = temp_store();
    let mut app = App::new(
        store.clone(),
        listing_browser(),
        api(),
        DiscoverySettings::default(),
    );

    let summary = app.run(Mode::Full, &JsonOutput).unwrap();
    assert_eq!(summary.mode, Mode::Full);
    assert_eq!(summary.discovered, Some(3));
    assert_eq!(summary.resolved, 2);
    assert_eq!(summary.dropped, vec!["200".to_string()]);
    assert_eq!(summary.artifacts.len(), 3);

    assert_eq!(store.read_ids().unwrap(), ids(&["001", "045", "200"]));

    let catalog = store.read_catalog().unwrap();
    let fetched: Vec<_> = catalog.iter().map(|record| record.id.as_str()).collect();
    assert_eq!(fetched, vec!["001", "045"]);

    let sorted = store.read_sorted_catalog().unwrap();
    assert_eq!(sorted[0].kind, InstrumentKind::Etf);
    assert_eq!(sorted[1].kind, InstrumentKind::Fund);
}

#[test]
fn discovery_failure_writes_nothing() {
    let (_temp, store) = temp_store();
    let browser = MockBrowser {
        fail_listing: true,
        ..listing_browser()
    };
    let mut app = App::new(store.clone(), browser, api(), DiscoverySettings::default());

    let err = app.run(Mode::Full, &JsonOutput).unwrap_err();
    assert!(err.is_navigation());
    assert!(!store.paths().ids.as_std_path().exists());
    assert!(!store.paths().catalog.as_std_path().exists());
}

#[test]
fn from_ids_uses_saved_list_without_browsing() {
    let (_temp, store) = temp_store();
    store.write_ids(&ids(&["045", "200"])).unwrap();
    let mut app = App::new(
        store.clone(),
        MockBrowser::default(),
        api(),
        DiscoverySettings::default(),
    );

    let summary = app.run(Mode::FromIds, &JsonOutput).unwrap();
    assert_eq!(summary.mode, Mode::FromIds);
    assert_eq!(summary.discovered, None);
    assert_eq!(summary.resolved, 1);
    assert_eq!(store.read_sorted_catalog().unwrap()[0].id, "045");
}

#[test]
fn rank_only_resorts_saved_catalog() {
    let (_temp, store) = temp_store();
    let catalog = vec![
        record("a", InstrumentKind::Fund, 1.0, 0.1, 0.0),
        record("b", InstrumentKind::Etf, 0.2, 0.0, 0.0),
        record("c", InstrumentKind::Fund, 0.5, 0.0, 0.25),
    ];
    store.write_catalog(&catalog).unwrap();
    let api = MockApi::default();
    let mut app = App::new(
        store.clone(),
        MockBrowser::default(),
        api,
        DiscoverySettings::default(),
    );

    let summary = app.run(Mode::RankOnly, &JsonOutput).unwrap();
    assert_eq!(summary.ranked, 3);

    let sorted: Vec<_> = store
        .read_sorted_catalog()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(sorted, vec!["b", "c", "a"]);
    // The canonical catalog is not reordered.
    assert_eq!(store.read_catalog().unwrap(), catalog);
}

#[test]
fn rank_only_without_catalog_fails() {
    let (_temp, store) = temp_store();
    let mut app = App::new(
        store,
        MockBrowser::default(),
        MockApi::default(),
        DiscoverySettings::default(),
    );
    assert_matches!(
        app.run(Mode::RankOnly, &JsonOutput),
        Err(CatalogError::Filesystem(_))
    );
}

#[test]
fn ids_saved_by_full_run_load_in_from_ids_run() {
    let (_temp, store) = temp_store();
    let browser = MockBrowser {
        listing: vec![
            "https://info.tase.co.il/Fund.aspx?ObjectID=0".to_string(),
            "https://info.tase.co.il/Fund.aspx?ObjectID=01".to_string(),
        ],
        ..MockBrowser::default()
    };
    let api = MockApi::default().with(
        InstrumentKind::Fund,
        "1",
        Reply::Found(fund_payload("1", 0.4, 0.1)),
    );
    let mut app = App::new(store.clone(), browser, api, DiscoverySettings::default());

    let full = app.run(Mode::Full, &JsonOutput).unwrap();
    assert_eq!(full.discovered, Some(1));
    assert_eq!(store.read_ids().unwrap(), ids(&["1"]));

    let again = app.run(Mode::FromIds, &JsonOutput).unwrap();
    assert_eq!(again.resolved, 1);
    assert!(again.dropped.is_empty());
}
