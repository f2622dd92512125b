use log::{debug, info};

use crate::domain::Branch;
use crate::error::Result;
use crate::git::{command_failed, CommandRunner, Git};

/// Branch queries and checkout
pub struct BranchRepository<'a, R: CommandRunner> {
    git: &'a Git<R>,
}

impl<'a, R: CommandRunner> BranchRepository<'a, R> {
    pub fn new(git: &'a Git<R>) -> Self {
        BranchRepository { git }
    }

    fn branch_list(&self) -> Result<Vec<String>> {
        let args = ["branch", "--list"];
        let result = self.git.query(&args)?;
        if !result.success() {
            return Err(command_failed(&args, &result));
        }
        Ok(result.stdout)
    }

    /// The checked-out branch, `None` on a detached HEAD or unborn repository
    pub fn current(&self) -> Result<Option<Branch>> {
        Ok(Branch::current_from_list(&self.branch_list()?))
    }

    pub fn list(&self) -> Result<Vec<Branch>> {
        Ok(self
            .branch_list()?
            .iter()
            .filter_map(|line| Branch::from_list_line(line))
            .collect())
    }

    /// Switch to `branch`, creating it first when `create` is set.
    ///
    /// The switch is confirmed by reading the current branch back; the exit
    /// code of checkout alone is not trusted.
    pub fn checkout(&self, branch: &str, create: bool) -> Result<()> {
        let args: Vec<&str> = if create {
            vec!["checkout", "-b", branch]
        } else {
            vec!["checkout", branch]
        };
        let result = self.git.query(&args)?;
        debug!("git {} exited with {}", args.join(" "), result.exit_code);

        match self.current()? {
            Some(current) if current.name == branch => {
                info!("Checked out branch {}", branch);
                Ok(())
            }
            _ => Err(command_failed(&args, &result)),
        }
    }

    /// Pull `branch` from the remote
    pub fn pull(&self, branch: &str) -> Result<()> {
        self.git.execute(&["pull", self.git.remote(), branch])?;
        debug!("Pulled {} from {}", branch, self.git.remote());
        Ok(())
    }
}
