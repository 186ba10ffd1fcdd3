//! Persisted options: save, load, and schema migration

use bookbinder::config::{CONFIG_VERSION, ConfigStore, PrintConfig};

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("options.json"));
    assert_eq!(store.load().unwrap(), PrintConfig::default());
}

#[test]
fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join("nested").join("options.json"));

    let config = PrintConfig {
        min_page_delay_ms: 100,
        max_page_delay_ms: 200,
        include_cover: false,
        fail_on_error: false,
        ..PrintConfig::default()
    };
    store.save(&config).unwrap();
    assert_eq!(store.load().unwrap(), config);
}

#[test]
fn unversioned_file_is_migrated_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    // Written by a build that predates the versioned schema: zero pacing
    // bounds and no version field.
    std::fs::write(
        &path,
        r#"{"min_page_delay_ms": 0, "max_page_delay_ms": 0, "include_title": false}"#,
    )
    .unwrap();

    let config = ConfigStore::new(&path).load().unwrap();
    let defaults = PrintConfig::default();
    assert_eq!(config.min_page_delay_ms, defaults.min_page_delay_ms);
    assert_eq!(config.max_page_delay_ms, defaults.max_page_delay_ms);
    assert_eq!(config.version, CONFIG_VERSION);
    // Non-pacing fields are kept
    assert!(!config.include_title);
}

#[test]
fn malformed_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("options.json");
    std::fs::write(&path, "not json").unwrap();
    assert!(ConfigStore::new(&path).load().is_err());
}
