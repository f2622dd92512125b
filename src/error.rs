use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Unified error type for tagkeeper operations
#[derive(Error, Debug)]
pub enum TagkeeperError {
    #[error("Invalid tag format: '{0}' - expected MAJOR.MINOR.PATCH")]
    InvalidTagFormat(String),

    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),

    #[error("Git identity is not configured (global user.name and user.email are required)")]
    GitNotConfigured,

    #[error("Git command failed (`git {command}`, exit code {exit_code}): {}", summarize(.output))]
    CommandFailed {
        command: String,
        exit_code: i32,
        output: Vec<String>,
    },

    #[error("Tag '{tag}' changed locally but the remote was not updated: {detail}")]
    PartialTagState { tag: String, detail: String },

    #[error("Setting tag '{tag}' failed after {attempts} attempt(s)")]
    RetryExhausted { tag: String, attempts: u32 },

    #[error("Current branch could not be determined")]
    NoCurrentBranch,

    #[error("Git binary not found: {}", .0.display())]
    GitNotFound(PathBuf),

    #[error("Git command timed out after {}s: git {command}", .timeout.as_secs())]
    Timeout { command: String, timeout: Duration },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience type alias for Results in tagkeeper
pub type Result<T> = std::result::Result<T, TagkeeperError>;

fn summarize(output: &[String]) -> String {
    output
        .iter()
        .map(|line| line.trim())
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
        .to_string()
}

impl TagkeeperError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        TagkeeperError::Config(msg.into())
    }

    /// Create an invalid tag error for the given input
    pub fn invalid_tag(tag: impl Into<String>) -> Self {
        TagkeeperError::InvalidTagFormat(tag.into())
    }

    /// Environment failures are not outcomes of the requested operation: the
    /// git binary is missing, hung, or the process could not be spawned.
    pub fn is_environment(&self) -> bool {
        matches!(
            self,
            TagkeeperError::GitNotFound(_) | TagkeeperError::Timeout { .. } | TagkeeperError::Io(_)
        )
    }

    /// Precondition failures the user can fix with a config command
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            TagkeeperError::NotARepository(_) | TagkeeperError::GitNotConfigured
        )
    }

    /// Captured git output attached to the error, if any
    pub fn output(&self) -> &[String] {
        match self {
            TagkeeperError::CommandFailed { output, .. } => output,
            _ => &[],
        }
    }
}
