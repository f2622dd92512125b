//! Tag lifecycle orchestration
//!
//! [TagLifecycleManager] strings the repositories together into the
//! operations callers use: compute the next tag, set it (create + push with
//! one retry), delete it locally and remotely, and push it.
//!
//! Every operation re-reads the repository and starts with the same guard
//! (repository present, identity configured). No state is kept between
//! calls, and nothing serialises concurrent callers on the same repository.
//!
//! Local and remote are not updated atomically. When the local tag was
//! changed but the remote was not, the operation fails with
//! [TagkeeperError::PartialTagState] and the local change is left in place.

use std::path::PathBuf;

use log::{info, warn};

use crate::config::Config;
use crate::domain::tag;
use crate::domain::{Branch, BuildType, Tag};
use crate::error::{Result, TagkeeperError};
use crate::git::{
    BranchRepository, CommandRunner, ConfigurationChecker, Git, OutputClassifier, ProcessRunner,
    TagRepository,
};

/// Total attempts for the create + push sequence in [TagLifecycleManager::set_tag]
pub const SET_TAG_ATTEMPTS: u32 = 2;

pub struct TagLifecycleManager<R: CommandRunner = ProcessRunner> {
    git: Git<R>,
    config: Config,
}

impl TagLifecycleManager<ProcessRunner> {
    /// Manager driving the configured git binary in `workdir`
    pub fn open(workdir: impl Into<PathBuf>, config: Config) -> Self {
        let runner = ProcessRunner::from_config(&config.git);
        TagLifecycleManager::new(runner, workdir, config)
    }
}

impl<R: CommandRunner> TagLifecycleManager<R> {
    pub fn new(runner: R, workdir: impl Into<PathBuf>, config: Config) -> Self {
        let git = Git::new(runner, workdir, config.git.remote.clone());
        TagLifecycleManager { git, config }
    }

    pub fn with_classifier(mut self, classifier: impl OutputClassifier + 'static) -> Self {
        self.git = self.git.with_classifier(classifier);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn remote(&self) -> &str {
        self.git.remote()
    }

    fn tags(&self) -> TagRepository<'_, R> {
        TagRepository::new(&self.git)
    }

    fn branches(&self) -> BranchRepository<'_, R> {
        BranchRepository::new(&self.git)
    }

    fn checker(&self) -> ConfigurationChecker<'_, R> {
        ConfigurationChecker::new(&self.git)
    }

    /// Repository present and global identity configured
    pub fn check(&self) -> Result<()> {
        self.checker().ensure_ready()
    }

    pub fn is_repository_configured(&self) -> Result<bool> {
        let checker = self.checker();
        Ok(checker.is_repository()? && checker.is_identity_configured()?)
    }

    /// Accepts current and legacy shapes
    pub fn is_valid_tag(&self, tag: &str) -> bool {
        tag::is_accepted(tag)
    }

    pub fn current_tag(&self) -> Result<Option<String>> {
        self.check()?;
        self.tags().describe()
    }

    pub fn current_branch(&self) -> Result<Option<Branch>> {
        self.check()?;
        self.branches().current()
    }

    pub fn list_local_tags(&self) -> Result<Vec<String>> {
        self.check()?;
        self.tags().list_local()
    }

    pub fn list_remote_tags(&self) -> Result<Vec<String>> {
        self.check()?;
        self.tags().list_remote()
    }

    pub fn list_branches(&self) -> Result<Vec<Branch>> {
        self.check()?;
        self.branches().list()
    }

    pub fn checkout(&self, branch: &str, create: bool) -> Result<()> {
        self.check()?;
        self.branches().checkout(branch, create)
    }

    /// Next tag for `build_type`, or `None` when there is no current tag or
    /// it cannot be parsed.
    pub fn compute_next_tag(&self, build_type: BuildType) -> Result<Option<Tag>> {
        self.check()?;

        let Some(current) = self.tags().describe()? else {
            info!("Repository has no tag yet");
            return Ok(None);
        };

        match Tag::parse(&current) {
            Ok(current_tag) => {
                let next = current_tag.bump(build_type);
                if let Some(ref next) = next {
                    info!("Next {} tag after {} is {}", build_type, current, next);
                }
                Ok(next)
            }
            Err(_) => {
                warn!("Current tag '{}' is not a release tag", current);
                Ok(None)
            }
        }
    }

    /// Create `tag` locally (replacing any local tag of that name) and push
    /// it together with the current branch. The whole sequence is tried
    /// [SET_TAG_ATTEMPTS] times.
    ///
    /// Legacy input is normalized; the tag actually set is returned.
    pub fn set_tag(&self, tag: &str) -> Result<Tag> {
        let tag = Tag::parse(tag)?;
        self.check()?;

        let message = self.config.tagging.message_for(tag.as_str());
        let mut last_error = None;

        for attempt in 1..=SET_TAG_ATTEMPTS {
            match self.create_and_push(&tag, &message) {
                Ok(()) => {
                    info!("Tag {} set on {} (attempt {})", tag, self.remote(), attempt);
                    return Ok(tag);
                }
                Err(e @ TagkeeperError::GitNotFound(_)) => return Err(e),
                Err(e) => {
                    warn!(
                        "Setting tag {} failed (attempt {}/{}): {}",
                        tag, attempt, SET_TAG_ATTEMPTS, e
                    );
                    last_error = Some(e);
                }
            }
        }

        let detail = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt was made".to_string());

        // Local state may have changed even though the push never landed
        if self.tags().local_exists(tag.as_str())? {
            warn!("Tag {} exists locally but not on {}", tag, self.remote());
            return Err(TagkeeperError::PartialTagState {
                tag: tag.to_string(),
                detail,
            });
        }

        Err(TagkeeperError::RetryExhausted {
            tag: tag.to_string(),
            attempts: SET_TAG_ATTEMPTS,
        })
    }

    fn create_and_push(&self, tag: &Tag, message: &str) -> Result<()> {
        self.tags().create_local(tag.as_str(), message)?;
        self.push_unchecked(tag.as_str())
    }

    /// Pull the current branch, then push it together with `tag`.
    pub fn push_tag(&self, tag: &str) -> Result<()> {
        if !tag::is_accepted(tag) {
            return Err(TagkeeperError::invalid_tag(tag));
        }
        self.check()?;
        self.push_unchecked(tag)
    }

    fn push_unchecked(&self, tag: &str) -> Result<()> {
        let branches = self.branches();
        let branch = branches.current()?.ok_or(TagkeeperError::NoCurrentBranch)?;
        branches.pull(&branch.name)?;
        self.tags().push_with_branch(&branch.name, tag)
    }

    /// Delete `tag` locally, then on the remote. Either side being absent
    /// counts as already deleted.
    pub fn delete_tag(&self, tag: &str) -> Result<()> {
        if !tag::is_accepted(tag) {
            return Err(TagkeeperError::invalid_tag(tag));
        }
        self.check()?;

        let tags = self.tags();
        let was_local = tags.local_exists(tag)?;
        if was_local {
            tags.delete_local(tag)?;
        }

        // The remote lookup is part of the remote step: once the local tag
        // is gone, any remote failure leaves the two sides apart.
        match tags.delete_remote(tag) {
            Ok(()) => {}
            Err(e) if was_local && !e.is_environment() => {
                warn!("Tag {} deleted locally but not on {}", tag, self.remote());
                return Err(TagkeeperError::PartialTagState {
                    tag: tag.to_string(),
                    detail: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        info!("Tag {} deleted", tag);
        Ok(())
    }

    /// Compute the next tag for `build_type` and set it. `Ok(None)` when no
    /// next tag can be computed.
    pub fn auto_tag_and_set(&self, build_type: BuildType) -> Result<Option<Tag>> {
        match self.compute_next_tag(build_type)? {
            Some(next) => self.set_tag(next.as_str()).map(Some),
            None => Ok(None),
        }
    }
}
