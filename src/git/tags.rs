use log::{debug, info};

use crate::domain::tag;
use crate::error::Result;
use crate::git::{command_failed, CommandRunner, Git};

const DELETED_MARKER: &str = "[deleted]";

/// Local and remote tag operations.
///
/// Holds no state of its own; every query re-reads the repository.
pub struct TagRepository<'a, R: CommandRunner> {
    git: &'a Git<R>,
}

impl<'a, R: CommandRunner> TagRepository<'a, R> {
    pub fn new(git: &'a Git<R>) -> Self {
        TagRepository { git }
    }

    /// Most recent tag reachable from HEAD, or `None` if there is none yet
    pub fn describe(&self) -> Result<Option<String>> {
        let args = ["describe", "--tags", "--abbrev=0"];
        let result = self.git.query(&args)?;
        if !result.success() {
            // "fatal: No names found" is the normal first-release state
            debug!("git describe found no tag: {:?}", result.lines());
            return Ok(None);
        }
        Ok(result.first_line().map(str::to_string))
    }

    /// All local tags, one per output line
    pub fn list_local(&self) -> Result<Vec<String>> {
        let args = ["tag", "--list"];
        let result = self.git.query(&args)?;
        if !result.success() {
            return Err(command_failed(&args, &result));
        }
        Ok(result
            .stdout
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Release tags on the remote; unrelated refs are discarded
    pub fn list_remote(&self) -> Result<Vec<String>> {
        let args = ["ls-remote", "--tags", self.git.remote()];
        let result = self.git.query(&args)?;
        if !result.success() {
            return Err(command_failed(&args, &result));
        }

        let mut tags: Vec<String> = Vec::new();
        for line in &result.stdout {
            if let Some(name) = parse_ls_remote_line(line) {
                if tag::is_accepted(name) && !tags.iter().any(|t| t == name) {
                    tags.push(name.to_string());
                }
            }
        }
        Ok(tags)
    }

    pub fn local_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.list_local()?.iter().any(|t| t == tag))
    }

    pub fn remote_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.list_remote()?.iter().any(|t| t == tag))
    }

    /// Create an annotated tag at HEAD, replacing a local tag of the same name.
    pub fn create_local(&self, tag: &str, message: &str) -> Result<()> {
        if self.local_exists(tag)? {
            debug!("Tag {} already exists locally, recreating", tag);
            self.delete_local(tag)?;
        }
        self.git.execute(&["tag", "-a", tag, "-m", message])?;
        info!("Created local tag {}", tag);
        Ok(())
    }

    /// Delete a local tag. Succeeds without running anything if it is absent.
    pub fn delete_local(&self, tag: &str) -> Result<()> {
        if !self.local_exists(tag)? {
            debug!("Tag {} not present locally, nothing to delete", tag);
            return Ok(());
        }

        let args = ["tag", "-d", tag];
        let result = self.git.execute(&args)?;
        let confirmation = format!("Deleted tag '{}'", tag);
        if !result.lines().iter().any(|line| line.contains(&confirmation)) {
            return Err(command_failed(&args, &result));
        }
        info!("Deleted local tag {}", tag);
        Ok(())
    }

    /// Delete a tag on the remote. Succeeds without running anything if it is absent.
    pub fn delete_remote(&self, tag: &str) -> Result<()> {
        if !self.remote_exists(tag)? {
            debug!(
                "Tag {} not present on {}, nothing to delete",
                tag,
                self.git.remote()
            );
            return Ok(());
        }

        let refname = format!("refs/tags/{}", tag);
        let args = ["push", self.git.remote(), "--delete", refname.as_str()];
        let result = self.git.execute(&args)?;
        let confirmed = result
            .lines()
            .iter()
            .any(|line| line.contains(DELETED_MARKER) && line_names_tag(line, tag));
        if !confirmed {
            return Err(command_failed(&args, &result));
        }
        info!("Deleted tag {} on {}", tag, self.git.remote());
        Ok(())
    }

    /// Push `branch` and `tag` to the remote in one invocation.
    pub fn push_with_branch(&self, branch: &str, tag: &str) -> Result<()> {
        let refname = format!("refs/tags/{}", tag);
        self.git
            .execute(&["push", self.git.remote(), branch, refname.as_str()])?;
        info!("Pushed {} and tag {} to {}", branch, tag, self.git.remote());
        Ok(())
    }
}

/// Extract the tag name from `<sha>\trefs/tags/<name>[^{}]`
fn parse_ls_remote_line(line: &str) -> Option<&str> {
    let (_, refname) = line.split_once('\t')?;
    let name = refname.trim().strip_prefix("refs/tags/")?;
    Some(name.strip_suffix("^{}").unwrap_or(name))
}

fn line_names_tag(line: &str, tag: &str) -> bool {
    line.split_whitespace()
        .any(|word| word == tag || word == format!("refs/tags/{}", tag))
}
