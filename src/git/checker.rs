use log::{debug, warn};

use crate::error::{Result, TagkeeperError};
use crate::git::{CommandRunner, Git};

const NOT_A_REPOSITORY: &str = "not a git repository";
const UNREADABLE_CONFIG: &str = "unable to read config file";

/// Preconditions checked before any tag operation: the working directory is
/// a repository and a global identity is configured.
pub struct ConfigurationChecker<'a, R: CommandRunner> {
    git: &'a Git<R>,
}

fn mentions(lines: &[&str], marker: &str) -> bool {
    lines
        .iter()
        .any(|line| line.to_lowercase().contains(marker))
}

impl<'a, R: CommandRunner> ConfigurationChecker<'a, R> {
    pub fn new(git: &'a Git<R>) -> Self {
        ConfigurationChecker { git }
    }

    /// Fails closed: anything but an explicit "true" from git means no.
    pub fn is_repository(&self) -> Result<bool> {
        let result = self.git.query(&["rev-parse", "--is-inside-work-tree"])?;
        let lines = result.lines();
        if mentions(&lines, NOT_A_REPOSITORY) {
            return Ok(false);
        }
        Ok(result.success() && result.first_line() == Some("true"))
    }

    fn global_value(&self, key: &str) -> Result<Option<String>> {
        let result = self.git.query(&["config", "--global", key])?;
        if mentions(&result.lines(), UNREADABLE_CONFIG) {
            warn!("Global git config could not be read while looking up {}", key);
            return Ok(None);
        }
        Ok(result
            .first_line()
            .filter(|value| !value.is_empty())
            .map(str::to_string))
    }

    /// Both global user.name and user.email must be set and readable.
    pub fn is_identity_configured(&self) -> Result<bool> {
        let name = self.global_value("user.name")?;
        let email = self.global_value("user.email")?;
        debug!("Global identity: name={:?} email={:?}", name, email);
        Ok(name.is_some() && email.is_some())
    }

    /// Guard run at the start of every lifecycle operation.
    pub fn ensure_ready(&self) -> Result<()> {
        if !self.is_repository()? {
            return Err(TagkeeperError::NotARepository(self.git.workdir().to_path_buf()));
        }
        if !self.is_identity_configured()? {
            return Err(TagkeeperError::GitNotConfigured);
        }
        Ok(())
    }
}
