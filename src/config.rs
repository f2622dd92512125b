use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, TagkeeperError};

/// Environment variable that overrides the configured git binary
pub const ENV_GIT_BIN: &str = "TAGKEEPER_GIT_BIN";

const LOCAL_CONFIG_FILE: &str = "./tagkeeper.toml";
const USER_CONFIG_FILE: &str = ".tagkeeper.toml";

/// Represents the complete configuration for tagkeeper.
///
/// Contains the git invocation settings and tagging behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub tagging: TaggingConfig,
}

fn default_binary() -> PathBuf {
    PathBuf::from("git")
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_tag_message() -> String {
    "Release {tag}".to_string()
}

/// How the git binary is invoked.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Upper bound for a single git subprocess
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GitConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            binary: default_binary(),
            remote: default_remote(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Settings for annotated tag creation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TaggingConfig {
    /// Annotated tag message; `{tag}` is replaced with the tag name
    #[serde(default = "default_tag_message")]
    pub message: String,
}

impl TaggingConfig {
    pub fn message_for(&self, tag: &str) -> String {
        self.message.replace("{tag}", tag)
    }
}

impl Default for TaggingConfig {
    fn default() -> Self {
        TaggingConfig {
            message: default_tag_message(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every git call fail.
    pub fn validate(&self) -> Result<()> {
        if self.git.binary.as_os_str().is_empty() {
            return Err(TagkeeperError::config("git.binary must not be empty"));
        }
        if self.git.remote.trim().is_empty() {
            return Err(TagkeeperError::config("git.remote must not be empty"));
        }
        if self.git.timeout_secs == 0 {
            return Err(TagkeeperError::config(
                "git.timeout_secs must be greater than zero",
            ));
        }
        if self.tagging.message.trim().is_empty() {
            return Err(TagkeeperError::config("tagging.message must not be empty"));
        }
        Ok(())
    }

    /// Apply `TAGKEEPER_GIT_BIN` if it is set.
    pub fn apply_env(mut self) -> Result<Self> {
        if let Some(binary) = std::env::var_os(ENV_GIT_BIN) {
            if binary.is_empty() {
                return Err(TagkeeperError::config(format!(
                    "{ENV_GIT_BIN} is set but empty. Provide a valid git binary path or unset it."
                )));
            }
            self.git.binary = PathBuf::from(binary);
        }
        Ok(self)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `tagkeeper.toml` in current directory
/// 3. `.tagkeeper.toml` in user config directory
/// 4. Default configuration if no file found
///
/// The `TAGKEEPER_GIT_BIN` environment variable is applied last.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read, parsed or validated
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config = if let Some(path) = config_path {
        Config::from_toml(&fs::read_to_string(path)?)?
    } else if Path::new(LOCAL_CONFIG_FILE).exists() {
        Config::from_toml(&fs::read_to_string(LOCAL_CONFIG_FILE)?)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(USER_CONFIG_FILE);
        if config_path.exists() {
            Config::from_toml(&fs::read_to_string(config_path)?)?
        } else {
            Config::default()
        }
    } else {
        Config::default()
    };

    config.apply_env()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.git.binary, PathBuf::from("git"));
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.timeout(), Duration::from_secs(120));
        assert_eq!(config.tagging.message_for("1.2.3"), "Release 1.2.3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
[git]
remote = "upstream"
"#,
        )
        .unwrap();
        assert_eq!(config.git.remote, "upstream");
        assert_eq!(config.git.timeout_secs, 120);
        assert_eq!(config.tagging.message, "Release {tag}");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::from_toml("[git]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_empty_binary_rejected() {
        let err = Config::from_toml("[git]\nbinary = \"\"\n").unwrap_err();
        assert!(err.to_string().contains("git.binary"));
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml("[git\nremote = ").unwrap_err();
        assert!(matches!(err, TagkeeperError::Toml(_)));
    }
}
