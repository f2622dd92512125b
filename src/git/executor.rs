use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, trace, warn};
use wait_timeout::ChildExt;

use crate::config::GitConfig;
use crate::error::{Result, TagkeeperError};
use crate::git::{CommandResult, CommandRunner};

/// Default bound on a single git invocation
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Spawns the git binary directly (no shell) and waits for it with a timeout.
///
/// The runner holds no per-call state; working directory and arguments are
/// supplied on every [CommandRunner::run] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRunner {
    binary: PathBuf,
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        ProcessRunner {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        ProcessRunner::new(config.binary.clone(), config.timeout())
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ProcessRunner {
    /// Output is matched against English messages, so the locale is pinned.
    fn command(&self, workdir: &Path, args: &[&str]) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .current_dir(workdir)
            .env("GIT_TERMINAL_PROMPT", "0")
            .env("LC_ALL", "C")
            .env("LANGUAGE", "C")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        command
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        ProcessRunner::new("git", DEFAULT_TIMEOUT)
    }
}

/// Split a stream into lines. Invalid UTF-8 is replaced, never dropped, so
/// every line reaches the failure-marker scan.
fn read_lines(stream: impl Read) -> Vec<String> {
    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                lines.push(line.trim_end_matches(['\n', '\r']).to_string());
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("Stopped reading git output: {}", e);
                break;
            }
        }
    }
    lines
}

fn collect_lines<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<Vec<String>>> {
    stream.map(|stream| thread::spawn(move || read_lines(stream)))
}

fn join_lines(handle: Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

impl CommandRunner for ProcessRunner {
    fn run(&self, workdir: &Path, args: &[&str]) -> Result<CommandResult> {
        // Spawning into a missing directory also reports NotFound; keep that
        // apart from a missing binary.
        if !workdir.is_dir() {
            return Err(TagkeeperError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("working directory does not exist: {}", workdir.display()),
            )));
        }

        let rendered = args.join(" ");
        debug!(
            "Executing git command: {} {} (in {})",
            self.binary.display(),
            rendered,
            workdir.display()
        );

        let mut child = self
            .command(workdir, args)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => TagkeeperError::GitNotFound(self.binary.clone()),
                _ => TagkeeperError::Io(e),
            })?;

        // Drain both pipes while waiting so a chatty command cannot block on a full pipe
        let stdout = collect_lines(child.stdout.take());
        let stderr = collect_lines(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                warn!(
                    "git {} timed out after {}s and was killed",
                    rendered,
                    self.timeout.as_secs()
                );
                // Reader threads are left to finish on their own; a grandchild
                // (ssh, credential helper) may still hold the pipes open.
                return Err(TagkeeperError::Timeout {
                    command: rendered,
                    timeout: self.timeout,
                });
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(TagkeeperError::Io(e));
            }
        };

        let result = CommandResult::new(
            // No exit code means the process was killed by a signal
            status.code().unwrap_or(-1),
            join_lines(stdout),
            join_lines(stderr),
        );

        trace!(
            "git {} exited with {}: {:?}",
            rendered,
            result.exit_code,
            result.lines()
        );

        Ok(result)
    }
}
