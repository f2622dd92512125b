// tests/config_test.rs
use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tagkeeper::config::{load_config, Config, ENV_GIT_BIN};
use tagkeeper::TagkeeperError;
use tempfile::NamedTempFile;

fn config_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

#[test]
#[serial]
fn test_load_from_file() {
    let temp_file = config_file(
        r#"
[git]
binary = "/usr/local/bin/git"
remote = "upstream"
timeout_secs = 30

[tagging]
message = "Build {tag}"
"#,
    );

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.git.binary, PathBuf::from("/usr/local/bin/git"));
    assert_eq!(config.git.remote, "upstream");
    assert_eq!(config.git.timeout(), Duration::from_secs(30));
    assert_eq!(config.tagging.message_for("2.5.2"), "Build 2.5.2");
}

#[test]
#[serial]
fn test_empty_file_uses_defaults() {
    let temp_file = config_file("");
    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    let defaults = Config::default();
    assert_eq!(config.git.remote, defaults.git.remote);
    assert_eq!(config.git.timeout_secs, defaults.git.timeout_secs);
    assert_eq!(config.tagging.message, defaults.tagging.message);
}

#[test]
#[serial]
fn test_invalid_toml_is_rejected() {
    let temp_file = config_file("[git\nremote = ");
    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, TagkeeperError::Toml(_)));
}

#[test]
#[serial]
fn test_empty_remote_is_rejected() {
    let temp_file = config_file("[git]\nremote = \"  \"\n");
    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(matches!(err, TagkeeperError::Config(_)));
}

#[test]
#[serial]
fn test_missing_file_is_an_error() {
    let err = load_config(Some("/nonexistent/tagkeeper.toml")).unwrap_err();
    assert!(matches!(err, TagkeeperError::Io(_)));
}

#[test]
#[serial]
fn test_env_overrides_binary() {
    let temp_file = config_file("[git]\nbinary = \"git\"\n");
    env::set_var(ENV_GIT_BIN, "/opt/git/bin/git");
    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    env::remove_var(ENV_GIT_BIN);

    assert_eq!(result.unwrap().git.binary, PathBuf::from("/opt/git/bin/git"));
}

#[test]
#[serial]
fn test_empty_env_value_is_rejected() {
    let temp_file = config_file("");
    env::set_var(ENV_GIT_BIN, "");
    let result = load_config(Some(temp_file.path().to_str().unwrap()));
    env::remove_var(ENV_GIT_BIN);

    assert!(matches!(result.unwrap_err(), TagkeeperError::Config(_)));
}
