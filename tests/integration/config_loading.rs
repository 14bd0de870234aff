//! Integration tests for configuration loading.

use std::path::PathBuf;

use rtheme::config::AppConfig;
use rtheme::error::ThemeError;
use tempfile::TempDir;

use crate::common::env::{EnvGuard, with_rtheme_env};

#[test]
fn test_config_file_with_relative_paths() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "database_path = \"data/themes.db\"\nuser_id = \"house-manager\"\ndefault_dark_mode = true\n",
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.database_path, Some(dir.path().join("data/themes.db")));
    assert_eq!(config.user_id.as_deref(), Some("house-manager"));
    assert!(config.default_dark_mode);
}

#[test]
fn test_explicit_missing_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ThemeError::NotFound { .. }));
}

#[test]
fn test_unknown_keys_are_rejected() {
    let err = AppConfig::from_toml_str("colour = \"blue\"", &PathBuf::from("/")).unwrap_err();
    assert!(matches!(err, ThemeError::ConfigParse(_)));
}

#[test]
fn test_environment_overrides_file() {
    let _env = with_rtheme_env("/tmp/rtheme-env.db", Some("env-user"));
    let config = AppConfig {
        database_path: Some(PathBuf::from("/var/lib/rtheme/themes.db")),
        user_id: Some("file-user".into()),
        ..AppConfig::default()
    }
    .with_env_overrides()
    .unwrap();

    assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/rtheme-env.db"));
    assert_eq!(config.user_id.as_deref(), Some("env-user"));
}

#[test]
fn test_empty_environment_values_are_ignored() {
    let _env = EnvGuard::apply(&[("RTHEME_DB", Some("")), ("RTHEME_USER", None)]);
    let config = AppConfig {
        user_id: Some("file-user".into()),
        ..AppConfig::default()
    }
    .with_env_overrides()
    .unwrap();

    assert_eq!(config.database_path, None);
    assert_eq!(config.user_id.as_deref(), Some("file-user"));
}
