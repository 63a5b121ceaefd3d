//! Configuration loading tests

use playtest_swarm::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config_file() {
    let file = write_config(
        r#"
parallel_tests = false
temperature = 0.2
model = "fast"
request_timeout_ms = 15000
"#,
    );

    let config = OrchestratorConfig::from_file(file.path()).unwrap();

    assert!(!config.parallel_tests);
    assert_eq!(config.temperature, 0.2);
    assert_eq!(config.model, ModelTier::Fast);
    assert_eq!(config.request_timeout_ms, 15_000);
}

#[test]
fn test_empty_config_file_is_default() {
    let file = write_config("");
    let config = OrchestratorConfig::from_file(file.path()).unwrap();
    assert_eq!(config, OrchestratorConfig::default());
}

#[test]
fn test_missing_file_is_config_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = OrchestratorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, PlaytestError::ConfigLoad { .. }));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_malformed_file_is_config_load_error() {
    let file = write_config("parallel_tests = [not toml");
    let err = OrchestratorConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, PlaytestError::ConfigLoad { .. }));
}

#[test]
fn test_out_of_range_values_are_rejected() {
    let file = write_config("temperature = 3.5");
    assert!(matches!(
        OrchestratorConfig::from_file(file.path()),
        Err(PlaytestError::InvalidConfiguration(_))
    ));

    let file = write_config("request_timeout_ms = 0");
    assert!(matches!(
        OrchestratorConfig::from_file(file.path()),
        Err(PlaytestError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_file_then_overrides() {
    let file = write_config("model = \"quality\"\ntemperature = 1.0");
    let config = OrchestratorConfig::from_file(file.path())
        .unwrap()
        .with_overrides_from(|key| match key {
            "PARALLEL_TESTS" => Some("off".to_string()),
            "REQUEST_TIMEOUT_MS" => Some("2500".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.model, ModelTier::Quality);
    assert_eq!(config.temperature, 1.0);
    assert!(!config.parallel_tests);
    assert_eq!(config.request_timeout_ms, 2500);
}

#[test]
fn test_process_environment_overrides() {
    std::env::set_var("PLAYTEST_MODEL", "Quality");
    std::env::set_var("PLAYTEST_TEMPERATURE", "0.4");
    let config = OrchestratorConfig::default().with_env_overrides();
    std::env::remove_var("PLAYTEST_MODEL");
    std::env::remove_var("PLAYTEST_TEMPERATURE");

    let config = config.unwrap();
    assert_eq!(config.model, ModelTier::Quality);
    assert_eq!(config.temperature, 0.4);
}
