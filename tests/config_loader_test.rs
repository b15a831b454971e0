use indoc::indoc;
use std::fs;
use tempfile::TempDir;

use surveydash::config::{load_config_from, load_config_near, CONFIG_FILE_NAME};
use surveydash::core::SurveyVariant;
use surveydash::errors::Error;
use surveydash::filter::FilterKey;

const CUSTOM_CONFIG: &str = indoc! {r#"
    [source]
    batch_size = 250

    [display]
    decimals = 2

    [variants.public]
    allowed_filters = ["AGE"]
"#};

#[test]
fn test_config_found_in_ancestor_directory() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), CUSTOM_CONFIG).unwrap();
    let nested = root.path().join("reports").join("2024");
    fs::create_dir_all(&nested).unwrap();

    let config = load_config_near(nested);

    assert_eq!(config.source.batch_size, 250);
    assert_eq!(config.source.page_size, 50);
    assert_eq!(config.display.decimals, 2);
    let public = config.profile(SurveyVariant::Public);
    assert!(public.allows_filter(&FilterKey::question("AGE")));
    assert!(!public.allows_filter(&FilterKey::question("GENDER")));
}

#[test]
fn test_nearest_config_wins() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), CUSTOM_CONFIG).unwrap();
    let nested = root.path().join("team");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join(CONFIG_FILE_NAME), "[source]\nbatch_size = 10\n").unwrap();

    assert_eq!(load_config_near(nested).source.batch_size, 10);
}

#[test]
fn test_broken_discovered_config_falls_back_to_defaults() {
    let root = TempDir::new().unwrap();
    fs::write(root.path().join(CONFIG_FILE_NAME), "[source\nbatch_size = ").unwrap();

    let config = load_config_near(root.path().to_path_buf());

    assert_eq!(config.source.batch_size, 1000);
}

#[test]
fn test_geocode_limits_are_raised_to_minimums() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join(CONFIG_FILE_NAME),
        "[geocode]\ndebounce_ms = 50\nmin_query_len = 1\n",
    )
    .unwrap();

    let config = load_config_near(root.path().to_path_buf());
    let gate = config.suggestion_gate();

    assert_eq!(gate.debounce().as_millis(), 300);
    assert_eq!(gate.min_len(), 3);
}

#[test]
fn test_explicit_config_errors_carry_path() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("custom.toml");
    fs::write(&path, "[export]\npage_height = 50.0\nmargin = 40.0\n").unwrap();

    match load_config_from(&path) {
        Err(Error::Configuration { path: Some(p), .. }) => assert_eq!(p, path),
        other => panic!("expected configuration error, got {other:?}"),
    }

    let missing = root.path().join("missing.toml");
    assert!(load_config_from(&missing).is_err());
}
