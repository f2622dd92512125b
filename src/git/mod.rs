//! Git subprocess layer
//!
//! Every git interaction goes through a [CommandRunner], which takes the
//! working directory and the argument vector per call and returns a fresh
//! [CommandResult]. Nothing is cached between calls: tag and branch state is
//! re-read from the repository every time.
//!
//! - [executor::ProcessRunner]: spawns the real git binary with a timeout
//! - [mock::MockGit]: in-memory git used by tests
//!
//! The repositories ([TagRepository], [BranchRepository],
//! [ConfigurationChecker]) are borrowed views over a shared [Git] handle.

pub mod branches;
pub mod checker;
pub mod classifier;
pub mod executor;
pub mod mock;
pub mod tags;

pub use branches::BranchRepository;
pub use checker::ConfigurationChecker;
pub use classifier::{MarkerClassifier, OutputClassifier};
pub use executor::ProcessRunner;
pub use mock::MockGit;
pub use tags::TagRepository;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{Result, TagkeeperError};

/// Outcome of one git invocation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub exit_code: i32,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
}

impl CommandResult {
    pub fn new(exit_code: i32, stdout: Vec<String>, stderr: Vec<String>) -> Self {
        CommandResult {
            exit_code,
            stdout,
            stderr,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Combined output, stdout lines first
    pub fn lines(&self) -> Vec<&str> {
        self.stdout
            .iter()
            .chain(self.stderr.iter())
            .map(String::as_str)
            .collect()
    }

    /// Owned copy of the combined output for error reporting
    pub fn output(&self) -> Vec<String> {
        self.stdout.iter().chain(self.stderr.iter()).cloned().collect()
    }

    /// First non-blank stdout line, trimmed
    pub fn first_line(&self) -> Option<&str> {
        self.stdout
            .iter()
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
    }
}

/// Runs the git binary with an explicit argument vector in a working directory.
///
/// Implementations must not go through a shell. A missing binary is reported
/// as [TagkeeperError::GitNotFound], distinct from a non-zero exit code, which
/// is a normal [CommandResult].
pub trait CommandRunner: Send + Sync {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult> {
        (**self).run(workdir, args)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult> {
        (**self).run(workdir, args)
    }
}

/// Shared handle for one repository: runner, classifier, working directory
/// and remote name.
pub struct Git<R: CommandRunner> {
    runner: R,
    classifier: Box<dyn OutputClassifier>,
    workdir: PathBuf,
    remote: String,
}

impl<R: CommandRunner> Git<R> {
    pub fn new(runner: R, workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Git {
            runner,
            classifier: Box::new(MarkerClassifier::default()),
            workdir: workdir.into(),
            remote: remote.into(),
        }
    }

    /// Replace the failure-marker strategy used for state-changing commands
    pub fn with_classifier(mut self, classifier: impl OutputClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a command and hand back the raw result, whatever the exit code.
    pub fn query(&self, args: &[&str]) -> Result<CommandResult> {
        self.runner.run(&self.workdir, args)
    }

    /// Run a state-changing command. Succeeds only if the exit code is zero
    /// and the output carries no failure marker.
    pub fn execute(&self, args: &[&str]) -> Result<CommandResult> {
        let result = self.query(args)?;

        if !result.success() {
            return Err(command_failed(args, &result));
        }

        if self.classifier.has_failure_marker(&result.lines()) {
            warn!(
                "git {} exited 0 but reported a failure: {:?}",
                args.join(" "),
                result.lines()
            );
            return Err(command_failed(args, &result));
        }

        debug!("git {} succeeded", args.join(" "));
        Ok(result)
    }
}

pub(crate) fn command_failed(args: &[&str], result: &CommandResult) -> TagkeeperError {
    TagkeeperError::CommandFailed {
        command: args.join(" "),
        exit_code: result.exit_code,
        output: result.output(),
    }
}
