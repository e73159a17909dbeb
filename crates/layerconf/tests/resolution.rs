//! Integration tests for candidate resolution and typed access against the
//! checked-in fixtures.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use layerconf::{Conf, ConfigHandle, LoadStage, LogFormat};

fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("testdata")
        .join(name)
}

#[test]
fn test_fixture_typed_values() {
    let config = ConfigHandle::new("test-project", &[testdata("test-project.toml")]);

    assert!(config.diagnostics().is_empty());
    assert_eq!(config.get_string("category1.string"), "foobar");
    assert_eq!(config.get_int("category1.int"), 8008);
    assert!(config.get_bool("typing.bool"));
    assert_eq!(config.get_duration("typing.duration"), Duration::from_secs(10));
    assert_eq!(config.get_float64("typing.float64"), 12.75);
    assert_eq!(config.get_int("typing.int"), 1337);
    assert_eq!(config.get_int_slice("typing.intslice"), vec![100, 200, 50]);
    assert_eq!(config.get_string("typing.string"), "foobarmoo");
    assert_eq!(
        config.get_string_slice("typing.stringslice"),
        vec!["one", "two", "three"]
    );
}

#[test]
fn test_only_last_candidate_exists() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let candidates = vec![
        temp_dir.path().join("first.toml"),
        temp_dir.path().join("second.toml"),
        temp_dir.path().join("third.toml"),
        testdata("test-project.toml"),
    ];

    let config = ConfigHandle::new("test-project", &candidates);

    assert_eq!(config.filename(), testdata("test-project.toml"));
    assert_eq!(config.get_string("category1.string"), "foobar");
    assert_eq!(config.diagnostics().len(), 3);
    assert!(
        config
            .diagnostics()
            .iter()
            .all(|d| d.stage == LoadStage::Candidate && d.error.is_not_found())
    );
}

#[test]
fn test_earlier_candidate_wins_over_last() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let early = temp_dir.path().join("early.toml");
    fs::write(&early, "[category1]\nstring = \"early\"\n").expect("Failed to write config");

    let config = ConfigHandle::new("test-project", &[early.clone(), testdata("test-project.toml")]);

    assert_eq!(config.filename(), early);
    assert_eq!(config.get_string("category1.string"), "early");
    assert_eq!(config.get_int("category1.int"), 0);
}

#[test]
fn test_broken_candidate_is_reported_and_skipped() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let broken = temp_dir.path().join("broken.toml");
    fs::write(&broken, "invalid toml [[[").expect("Failed to write config");

    let config = ConfigHandle::new("test-project", &[broken, testdata("test-project.toml")]);

    assert_eq!(config.get_int("typing.int"), 1337);
    assert_eq!(config.diagnostics().len(), 1);
    assert!(!config.diagnostics()[0].error.is_not_found());
}

#[test]
fn test_search_paths_used_without_candidates() {
    let config = ConfigHandle::builder("test-project")
        .search_paths([PathBuf::from("/nonexistent-layerconf-dir"), testdata("")])
        .build();

    assert_eq!(config.filename(), testdata("test-project.toml"));
    assert_eq!(config.get_int("category1.int"), 8008);
}

#[test]
fn test_debug_key_selects_development_logging() {
    let config = ConfigHandle::new("test-project", &[testdata("test-project.toml")]);
    let log_config = config.log_config();
    assert!(log_config.development);
    assert_eq!(log_config.format, LogFormat::Text);

    config.set_bool("debug", false);
    let log_config = config.log_config();
    assert!(!log_config.development);
    assert_eq!(log_config.format, LogFormat::Json);
}

#[test]
fn test_string_forms_of_typed_values() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = ConfigHandle::new("app", &[temp_dir.path().join("app.toml")]);

    config.set_bool("typing.bool", false);
    config.set_int("typing.int", 2600);
    config.set_float64("typing.float64", 6.2);
    config.set_duration("typing.duration", Duration::from_secs(15));

    assert_eq!(config.get_string("typing.bool"), "false");
    assert_eq!(config.get_string("typing.int"), "2600");
    assert_eq!(config.get_string("typing.float64"), "6.2");
    assert_eq!(config.get_string("typing.duration"), "15s");
}

#[test]
fn test_defaults_never_shadow_file_values() {
    let config = ConfigHandle::new("test-project", &[testdata("test-project.toml")]);

    config.set_default("category1.int", 1);
    config.set_default("category1.missing", "fallback");

    assert_eq!(config.get_int("category1.int"), 8008);
    assert_eq!(config.get_string("category1.missing"), "fallback");
    assert!(config.is_set("category1.missing"));
    assert!(config.all_keys().contains(&"category1.missing".to_string()));
}

#[test]
fn test_keys_are_case_insensitive() {
    let config = ConfigHandle::new("test-project", &[testdata("test-project.toml")]);

    assert_eq!(config.get_string("Category1.STRING"), "foobar");
    config.set_string("CATEGORY1.String", "changed");
    assert_eq!(config.get_string("category1.string"), "changed");
}
