/// Marker `git branch` puts in front of the checked-out branch
const CURRENT_MARKER: &str = "* ";

/// A branch name as listed by `git branch`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch {
    pub name: String,
}

impl Branch {
    /// Create a new branch from a name
    pub fn new(name: impl Into<String>) -> Self {
        Branch { name: name.into() }
    }

    /// Parse one line of `git branch` output.
    ///
    /// Strips the current (`* `) and worktree (`+ `) markers. Returns `None`
    /// for blank lines and for the detached-HEAD pseudo entry.
    pub fn from_list_line(line: &str) -> Option<Self> {
        let name = line
            .strip_prefix(CURRENT_MARKER)
            .or_else(|| line.strip_prefix("+ "))
            .unwrap_or(line)
            .trim();

        if name.is_empty() || name.starts_with('(') {
            return None;
        }

        Some(Branch::new(name))
    }

    /// Find the checked-out branch in `git branch` output: the first line
    /// carrying the current marker.
    pub fn current_from_list<S: AsRef<str>>(lines: &[S]) -> Option<Self> {
        lines
            .iter()
            .map(AsRef::as_ref)
            .find(|line| line.starts_with(CURRENT_MARKER))
            .and_then(Branch::from_list_line)
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
