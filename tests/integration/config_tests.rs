use std::fs;
use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use tempfile::tempdir;
use utilbox::config::{Config, ConfigError};

#[test]
fn test_config_load_defaults() {
    // Figment without Env so other tests' variables cannot interfere
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.io_threads, 4);
    assert_eq!(config.min_size, 0);
    assert_eq!(config.hosts_file, PathBuf::from("/etc/hosts"));
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("UTILBOX_IO_THREADS", "16");
    std::env::set_var("UTILBOX_HOSTS_FILE", "/tmp/other-hosts");

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("UTILBOX_"));
    let config: Config = figment.extract().unwrap();

    std::env::remove_var("UTILBOX_IO_THREADS");
    std::env::remove_var("UTILBOX_HOSTS_FILE");

    assert_eq!(config.io_threads, 16);
    assert_eq!(config.hosts_file, PathBuf::from("/tmp/other-hosts"));
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
min_size = 1024
max_size = 1048576
skip_hidden = true
ignore_patterns = ["*.tmp", "node_modules/"]
tree_depth = 4
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.min_size, 1024);
    assert_eq!(config.max_size, Some(1_048_576));
    assert!(config.skip_hidden);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "node_modules/"]);
    assert_eq!(config.tree_depth, 4);
    // Unset keys keep their defaults
    assert_eq!(config.disk_usage_depth, 1);
    assert!(!config.follow_symlinks);
}

#[test]
fn test_config_load_from_path_missing_file_uses_defaults() {
    let temp_dir = tempdir().unwrap();
    let config = Config::load_from_path(&temp_dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.tree_depth, Config::default().tree_depth);
}

#[test]
fn test_config_load_from_path_invalid_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = \"not a number\"").unwrap();

    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn test_config_save_and_reload() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let config = Config {
        min_size: 42,
        follow_symlinks: true,
        ignore_patterns: vec!["target/".to_string()],
        ..Config::default()
    };
    config.save_to_path(&config_path).unwrap();

    let reloaded: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();
    assert_eq!(reloaded, config);
}
