//! Configuration system tests
//!
//! Tests for config paths and tool config loading/saving.

use iniedit::config::ToolConfig;
use iniedit::config_paths;
use iniedit::{Comparison, TextEncoding};
use tempfile::TempDir;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("iniedit"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_logs_dir_is_subdir_of_config() {
    let config = config_paths::config_dir().unwrap();
    let logs = config_paths::logs_dir().unwrap();
    assert!(logs.starts_with(&config));
}

// ========================================================================
// Tool Config Tests
// ========================================================================

#[test]
fn test_default_config() {
    let config = ToolConfig::default();
    assert_eq!(config.comparison, Comparison::IgnoreCase);
    assert!(!config.allow_escapes);
    assert_eq!(config.encoding, None);
    assert!(config.file_logging);
}

#[test]
fn test_config_serialize_deserialize() {
    let config = ToolConfig {
        comparison: Comparison::CaseSensitive,
        allow_escapes: true,
        encoding: Some(TextEncoding::Utf16Be),
        file_logging: false,
    };
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert!(yaml.contains("case-sensitive"));
    assert!(yaml.contains("utf-16be"));
    let parsed: ToolConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_save_and_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let config = ToolConfig {
        allow_escapes: true,
        ..ToolConfig::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(ToolConfig::load_from(&path), config);
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ToolConfig::load_from(&dir.path().join("absent.yaml"));
    assert_eq!(config, ToolConfig::default());
}

#[test]
fn test_unparsable_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "comparison: [not, an, enum]\n").unwrap();
    assert_eq!(ToolConfig::load_from(&path), ToolConfig::default());
}

#[test]
fn test_unknown_encoding_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "encoding: ebcdic\n").unwrap();
    assert_eq!(ToolConfig::load_from(&path), ToolConfig::default());
}
