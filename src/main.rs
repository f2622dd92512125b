use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use tagkeeper::boundary::BoundaryWarning;
use tagkeeper::domain::tag;
use tagkeeper::{load_config, ui, BuildType, TagLifecycleManager, TagkeeperError};

#[derive(Parser)]
#[command(
    name = "tagkeeper",
    version,
    about = "Compute, create, push and delete release tags"
)]
struct Args {
    #[arg(short = 'C', long = "dir", default_value = ".", help = "Repository to operate on")]
    dir: PathBuf,

    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Log git commands and decisions")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tag that would follow the current one
    Next {
        #[arg(help = "stage or prod")]
        build_type: BuildType,
    },
    /// Create a tag locally and push it with the current branch
    Set { tag: String },
    /// Compute the next tag and set it
    Auto {
        #[arg(help = "stage or prod")]
        build_type: BuildType,
    },
    /// Delete a tag locally and on the remote
    Delete {
        tag: String,
        #[arg(short, long, help = "Skip confirmation prompt")]
        force: bool,
    },
    /// Push an existing tag with the current branch
    Push { tag: String },
    /// Print the most recent tag reachable from HEAD
    Current,
    /// Print the current branch
    Branch,
    /// List tags
    Tags {
        #[arg(long, help = "List tags on the remote instead")]
        remote: bool,
    },
    /// Check whether a tag has an accepted format
    Validate { tag: String },
    /// Check that the directory is a repository with an identity configured
    Check,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &anyhow::Error) {
    ui::display_error(&format!("{:#}", err));

    let Some(tag_err) = err.downcast_ref::<TagkeeperError>() else {
        return;
    };
    ui::display_output(tag_err.output());

    if tag_err.is_precondition() {
        match tag_err {
            TagkeeperError::GitNotConfigured => ui::display_identity_hint(),
            _ => ui::display_status("Run inside a git working tree or pass -C <DIR>"),
        }
    }
}

/// Ok(false) means the command ran but has nothing to report as success.
fn run(args: Args) -> Result<bool> {
    let config = load_config(args.config.as_deref()).context("Error loading config")?;

    let manager = TagLifecycleManager::open(&args.dir, config);

    match args.command {
        Command::Next { build_type } => next(&manager, build_type),
        Command::Set { tag: name } => {
            set(&manager, &name)?;
            Ok(true)
        }
        Command::Auto { build_type } => auto(&manager, build_type),
        Command::Delete { tag: name, force } => delete(&manager, &name, force),
        Command::Push { tag: name } => {
            ui::display_status(&format!("Pushing tag {} to {}", name, manager.remote()));
            with_partial_warning(&manager, manager.push_tag(&name))?;
            ui::display_success(&format!("Pushed tag {}", name));
            Ok(true)
        }
        Command::Current => match manager.current_tag()? {
            Some(current) => {
                println!("{}", current);
                Ok(true)
            }
            None => {
                ui::display_boundary_warning(&BoundaryWarning::NoCurrentTag);
                Ok(false)
            }
        },
        Command::Branch => match manager.current_branch()? {
            Some(branch) => {
                println!("{}", branch);
                Ok(true)
            }
            None => Err(TagkeeperError::NoCurrentBranch.into()),
        },
        Command::Tags { remote } => {
            let tags = if remote {
                manager.list_remote_tags()?
            } else {
                manager.list_local_tags()?
            };
            let title = if remote {
                format!("Tags on {}:", manager.remote())
            } else {
                "Local tags:".to_string()
            };
            ui::display_list(&title, &tags);
            Ok(true)
        }
        Command::Check => {
            manager.check()?;
            ui::display_success(&format!(
                "{} is a repository with a git identity configured",
                args.dir.display()
            ));
            Ok(true)
        }
        Command::Validate { tag: name } => Ok(validate(&name)),
    }
}

fn validate(name: &str) -> bool {
    if tag::is_valid(name) {
        ui::display_success(&format!("{} is a valid tag", name));
        true
    } else if tag::is_valid_legacy(name) {
        ui::display_success(&format!("{} is a valid legacy tag", name));
        ui::display_boundary_warning(&BoundaryWarning::LegacyTagNormalized {
            from: name.to_string(),
            to: tag::normalize(name),
        });
        true
    } else {
        ui::display_error(&format!("'{}' is not a valid tag", name));
        false
    }
}

fn next(manager: &TagLifecycleManager, build_type: BuildType) -> Result<bool> {
    match manager.compute_next_tag(build_type)? {
        Some(next) => {
            println!("{}", next);
            Ok(true)
        }
        None => {
            let current = manager.current_tag()?;
            ui::display_boundary_warning(&BoundaryWarning::for_missing_next(current.as_deref()));
            Ok(false)
        }
    }
}

fn set(manager: &TagLifecycleManager, name: &str) -> Result<()> {
    if tag::is_valid_legacy(name) {
        ui::display_boundary_warning(&BoundaryWarning::LegacyTagNormalized {
            from: name.to_string(),
            to: tag::normalize(name),
        });
    }
    ui::display_status(&format!("Setting tag {} on {}", name, manager.remote()));
    let set = with_partial_warning(manager, manager.set_tag(name))?;
    ui::display_success(&format!("Tag {} created and pushed", set));
    Ok(())
}

fn auto(manager: &TagLifecycleManager, build_type: BuildType) -> Result<bool> {
    let current = manager.current_tag()?;
    match with_partial_warning(manager, manager.auto_tag_and_set(build_type))? {
        Some(set) => {
            ui::display_success(&format!(
                "{} tag {} created and pushed (was {})",
                build_type,
                set,
                current.as_deref().unwrap_or("none")
            ));
            Ok(true)
        }
        None => {
            ui::display_boundary_warning(&BoundaryWarning::for_missing_next(current.as_deref()));
            Ok(false)
        }
    }
}

fn delete(manager: &TagLifecycleManager, name: &str, force: bool) -> Result<bool> {
    if !force
        && !ui::confirm_action(&format!(
            "Delete tag '{}' locally and on '{}'?",
            name,
            manager.remote()
        ))?
    {
        println!("Operation cancelled by user.");
        return Ok(true);
    }

    with_partial_warning(manager, manager.delete_tag(name))?;
    ui::display_success(&format!("Tag {} deleted", name));
    Ok(true)
}

/// Show the partial-state warning with the remote name before handing the
/// error back.
fn with_partial_warning<T>(
    manager: &TagLifecycleManager,
    result: tagkeeper::Result<T>,
) -> Result<T> {
    result.map_err(|e| {
        if let Some(warning) = BoundaryWarning::from_error(&e, manager.remote()) {
            ui::display_boundary_warning(&warning);
        }
        anyhow::Error::new(e)
    })
}
