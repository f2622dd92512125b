use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::git::{CommandResult, CommandRunner};

/// In-memory stand-in for the git binary.
///
/// Interprets the argument vectors tagkeeper issues against a small model of
/// a repository: local tags, remote tags, branches and global identity.
/// Failures can be injected to exercise retry and partial-state paths. Every
/// invocation is recorded.
pub struct MockGit {
    state: Mutex<MockState>,
}

#[derive(Debug, Clone)]
struct MockState {
    is_repository: bool,
    user_name: Option<String>,
    user_email: Option<String>,
    config_unreadable: bool,
    local_tags: Vec<String>,
    remote_tags: Vec<String>,
    remote_refs: Vec<String>,
    branches: Vec<String>,
    current_branch: Option<String>,
    failing_pushes: u32,
    silent_push_failure: bool,
    failing_pull: bool,
    failing_remote_delete: bool,
    failing_tag_signing: bool,
    unreachable_remote: bool,
    ignore_checkout: bool,
    calls: Vec<Vec<String>>,
}

impl Default for MockState {
    fn default() -> Self {
        MockState {
            is_repository: true,
            user_name: Some("Release Bot".to_string()),
            user_email: Some("release@example.com".to_string()),
            config_unreadable: false,
            local_tags: Vec::new(),
            remote_tags: Vec::new(),
            remote_refs: Vec::new(),
            branches: vec!["main".to_string()],
            current_branch: Some("main".to_string()),
            failing_pushes: 0,
            silent_push_failure: false,
            failing_pull: false,
            failing_remote_delete: false,
            failing_tag_signing: false,
            unreachable_remote: false,
            ignore_checkout: false,
            calls: Vec::new(),
        }
    }
}

fn ok(stdout: Vec<String>) -> CommandResult {
    CommandResult::new(0, stdout, Vec::new())
}

fn ok_stderr(stderr: Vec<String>) -> CommandResult {
    CommandResult::new(0, Vec::new(), stderr)
}

fn fail(exit_code: i32, message: impl Into<String>) -> CommandResult {
    CommandResult::new(exit_code, Vec::new(), vec![message.into()])
}

impl MockGit {
    /// A configured repository on branch `main` with no tags
    pub fn new() -> Self {
        MockGit {
            state: Mutex::new(MockState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A test that panicked while holding the lock has already failed
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn update(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state());
        self
    }

    /// Tag present both locally and on the remote
    pub fn with_tag(self, tag: &str) -> Self {
        self.with_local_tag(tag).with_remote_tag(tag)
    }

    pub fn with_local_tag(self, tag: &str) -> Self {
        self.update(|s| s.local_tags.push(tag.to_string()))
    }

    pub fn with_remote_tag(self, tag: &str) -> Self {
        self.update(|s| s.remote_tags.push(tag.to_string()))
    }

    /// Extra ref under `refs/tags/` on the remote that is not a release tag
    pub fn with_remote_ref(self, name: &str) -> Self {
        self.update(|s| s.remote_refs.push(name.to_string()))
    }

    pub fn with_branch(self, branch: &str) -> Self {
        self.update(|s| s.branches.push(branch.to_string()))
    }

    pub fn not_a_repository(self) -> Self {
        self.update(|s| s.is_repository = false)
    }

    /// Neither user.name nor user.email is set globally
    pub fn unconfigured(self) -> Self {
        self.update(|s| {
            s.user_name = None;
            s.user_email = None;
        })
    }

    pub fn without_user_email(self) -> Self {
        self.update(|s| s.user_email = None)
    }

    /// Global config reads print "unable to read config file" but still answer
    pub fn with_unreadable_config(self) -> Self {
        self.update(|s| s.config_unreadable = true)
    }

    pub fn detached(self) -> Self {
        self.update(|s| s.current_branch = None)
    }

    /// The next `count` branch+tag pushes are rejected by the remote
    pub fn failing_pushes(self, count: u32) -> Self {
        self.update(|s| s.failing_pushes = count)
    }

    /// Pushes exit 0 but print a fatal message
    pub fn with_silent_push_failure(self) -> Self {
        self.update(|s| s.silent_push_failure = true)
    }

    pub fn failing_pull(self) -> Self {
        self.update(|s| s.failing_pull = true)
    }

    pub fn failing_remote_delete(self) -> Self {
        self.update(|s| s.failing_remote_delete = true)
    }

    /// `tag -a` exits 0 with a signing error and creates nothing
    pub fn with_failing_tag_signing(self) -> Self {
        self.update(|s| s.failing_tag_signing = true)
    }

    /// `ls-remote` cannot reach the remote
    pub fn with_unreachable_remote(self) -> Self {
        self.update(|s| s.unreachable_remote = true)
    }

    /// Checkout exits 0 without switching branches
    pub fn ignoring_checkout(self) -> Self {
        self.update(|s| s.ignore_checkout = true)
    }

    pub fn local_tags(&self) -> Vec<String> {
        self.state().local_tags.clone()
    }

    pub fn remote_tags(&self) -> Vec<String> {
        self.state().remote_tags.clone()
    }

    pub fn current_branch(&self) -> Option<String> {
        self.state().current_branch.clone()
    }

    /// Every argument vector received so far, in order
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.state().calls.clone()
    }

    /// Recorded calls whose first argument is `subcommand`
    pub fn calls_to(&self, subcommand: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.first().map(String::as_str) == Some(subcommand))
            .count()
    }
}

impl Default for MockGit {
    fn default() -> Self {
        Self::new()
    }
}

impl MockState {
    fn config_value(&self, key: &str) -> CommandResult {
        let value = match key {
            "user.name" => self.user_name.clone(),
            "user.email" => self.user_email.clone(),
            _ => None,
        };
        let mut result = match value {
            Some(value) => ok(vec![value]),
            None => CommandResult::new(1, Vec::new(), Vec::new()),
        };
        if self.config_unreadable {
            result
                .stderr
                .push("fatal: unable to read config file '/home/ci/.gitconfig': Permission denied".to_string());
        }
        result
    }

    fn branch_list(&self) -> CommandResult {
        let mut lines = Vec::new();
        if self.current_branch.is_none() {
            lines.push("* (HEAD detached at 1a2b3c4)".to_string());
        }
        for branch in &self.branches {
            if self.current_branch.as_deref() == Some(branch.as_str()) {
                lines.push(format!("* {}", branch));
            } else {
                lines.push(format!("  {}", branch));
            }
        }
        ok(lines)
    }

    fn ls_remote(&self) -> CommandResult {
        let mut lines = Vec::new();
        for (i, tag) in self.remote_tags.iter().enumerate() {
            lines.push(format!("{:040x}\trefs/tags/{}", i + 1, tag));
            lines.push(format!("{:040x}\trefs/tags/{}^{{}}", i + 100, tag));
        }
        for name in &self.remote_refs {
            lines.push(format!("{:040x}\trefs/tags/{}", 999, name));
        }
        ok(lines)
    }

    fn create_tag(&mut self, tag: &str) -> CommandResult {
        if self.failing_tag_signing {
            return ok_stderr(vec![
                "error: gpg failed to sign the data".to_string(),
                "error: unable to sign the tag".to_string(),
            ]);
        }
        if self.local_tags.iter().any(|t| t == tag) {
            return fail(128, format!("fatal: tag '{}' already exists", tag));
        }
        self.local_tags.push(tag.to_string());
        ok(Vec::new())
    }

    fn delete_tag(&mut self, tag: &str) -> CommandResult {
        match self.local_tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.local_tags.remove(index);
                ok(vec![format!("Deleted tag '{}' (was 1a2b3c4)", tag)])
            }
            None => fail(1, format!("error: tag '{}' not found.", tag)),
        }
    }

    fn delete_remote_tag(&mut self, refname: &str) -> CommandResult {
        let tag = refname.trim_start_matches("refs/tags/");
        if self.failing_remote_delete {
            return fail(
                1,
                "fatal: unable to access 'https://example.com/app.git/': Could not resolve host",
            );
        }
        match self.remote_tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.remote_tags.remove(index);
                ok_stderr(vec![
                    "To https://example.com/app.git".to_string(),
                    format!(" - [deleted]         {}", tag),
                ])
            }
            None => fail(
                1,
                format!("error: unable to delete '{}': remote ref does not exist", tag),
            ),
        }
    }

    fn push(&mut self, branch: &str, refname: &str) -> CommandResult {
        if self.failing_pushes > 0 {
            self.failing_pushes -= 1;
            return CommandResult::new(
                1,
                Vec::new(),
                vec![
                    "To https://example.com/app.git".to_string(),
                    format!(" ! [rejected]        {} -> {} (fetch first)", branch, branch),
                    "error: failed to push some refs to 'https://example.com/app.git'".to_string(),
                ],
            );
        }
        if self.silent_push_failure {
            return ok_stderr(vec![
                "fatal: the remote end hung up unexpectedly".to_string()
            ]);
        }
        let tag = refname.trim_start_matches("refs/tags/");
        if !self.local_tags.iter().any(|t| t == tag) {
            return fail(1, format!("error: src refspec {} does not match any", refname));
        }
        if !self.remote_tags.iter().any(|t| t == tag) {
            self.remote_tags.push(tag.to_string());
        }
        ok_stderr(vec![
            "To https://example.com/app.git".to_string(),
            format!(" * [new tag]         {} -> {}", tag, tag),
        ])
    }

    fn checkout(&mut self, branch: &str, create: bool) -> CommandResult {
        if self.ignore_checkout {
            return ok(Vec::new());
        }
        let exists = self.branches.iter().any(|b| b == branch);
        match (create, exists) {
            (true, true) => fail(
                128,
                format!("fatal: a branch named '{}' already exists", branch),
            ),
            (true, false) => {
                self.branches.push(branch.to_string());
                self.current_branch = Some(branch.to_string());
                ok_stderr(vec![format!("Switched to a new branch '{}'", branch)])
            }
            (false, true) => {
                self.current_branch = Some(branch.to_string());
                ok_stderr(vec![format!("Switched to branch '{}'", branch)])
            }
            (false, false) => fail(
                1,
                format!(
                    "error: pathspec '{}' did not match any file(s) known to git",
                    branch
                ),
            ),
        }
    }

    fn dispatch(&mut self, args: &[&str]) -> CommandResult {
        if let ["config", "--global", key] = args {
            return self.config_value(key);
        }

        if !self.is_repository {
            return fail(
                128,
                "fatal: not a git repository (or any of the parent directories): .git",
            );
        }

        match args {
            ["rev-parse", "--is-inside-work-tree"] => ok(vec!["true".to_string()]),
            ["describe", "--tags", "--abbrev=0"] => match self.local_tags.last() {
                Some(tag) => ok(vec![tag.clone()]),
                None => fail(128, "fatal: No names found, cannot describe anything."),
            },
            ["tag", "--list"] => ok(self.local_tags.clone()),
            ["ls-remote", "--tags", _remote] if self.unreachable_remote => fail(
                128,
                "fatal: unable to access 'https://example.com/app.git/': Could not resolve host",
            ),
            ["ls-remote", "--tags", _remote] => self.ls_remote(),
            ["tag", "-a", tag, "-m", _message] => self.create_tag(tag),
            ["tag", "-d", tag] => self.delete_tag(tag),
            ["push", _remote, "--delete", refname] => self.delete_remote_tag(refname),
            ["push", _remote, branch, refname] => self.push(branch, refname),
            ["pull", _remote, branch] => {
                if self.failing_pull {
                    fail(
                        1,
                        format!("fatal: couldn't find remote ref {}", branch),
                    )
                } else {
                    ok(vec!["Already up to date.".to_string()])
                }
            }
            ["branch", "--list"] => self.branch_list(),
            ["checkout", "-b", branch] => self.checkout(branch, true),
            ["checkout", branch] => self.checkout(branch, false),
            _ => fail(1, format!("error: unsupported command: git {}", args.join(" "))),
        }
    }
}

impl CommandRunner for MockGit {
    fn run(&self, _workdir: &Path, args: &[&str]) -> Result<CommandResult> {
        let mut state = self.state();
        state
            .calls
            .push(args.iter().map(|arg| arg.to_string()).collect());
        Ok(state.dispatch(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(mock: &MockGit, args: &[&str]) -> CommandResult {
        mock.run(Path::new("/repo"), args).unwrap()
    }

    #[test]
    fn test_mock_describe_reports_latest_tag() {
        let mock = MockGit::new().with_tag("1.0.0").with_tag("1.0.1");
        let result = run(&mock, &["describe", "--tags", "--abbrev=0"]);
        assert_eq!(result.first_line(), Some("1.0.1"));
    }

    #[test]
    fn test_mock_describe_without_tags_fails() {
        let mock = MockGit::new();
        let result = run(&mock, &["describe", "--tags", "--abbrev=0"]);
        assert!(!result.success());
    }

    #[test]
    fn test_mock_push_consumes_failures() {
        let mock = MockGit::new().with_local_tag("1.0.0").failing_pushes(1);
        let args = ["push", "origin", "main", "refs/tags/1.0.0"];
        assert!(!run(&mock, &args).success());
        assert!(run(&mock, &args).success());
        assert_eq!(mock.remote_tags(), vec!["1.0.0".to_string()]);
    }

    #[test]
    fn test_mock_records_calls() {
        let mock = MockGit::new();
        run(&mock, &["branch", "--list"]);
        run(&mock, &["tag", "--list"]);
        assert_eq!(mock.calls().len(), 2);
        assert_eq!(mock.calls_to("tag"), 1);
    }

    #[test]
    fn test_mock_outside_repository() {
        let mock = MockGit::new().not_a_repository();
        let result = run(&mock, &["rev-parse", "--is-inside-work-tree"]);
        assert_eq!(result.exit_code, 128);
    }
}
