//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Output formatting
//! - This module - Interactive prompts

use std::io::{self, BufRead, Write};

use anyhow::Result;

pub mod formatter;

pub use formatter::{
    display_boundary_warning, display_error, display_identity_hint, display_list, display_output,
    display_status, display_success,
};

/// Prompts user to confirm an action with a yes/no prompt.
///
/// Accepts "y" or "yes" (case-insensitive). Default is "no" if user presses
/// Enter.
pub fn confirm_action(prompt: &str) -> Result<bool> {
    print!("\n{} (y/N): ", prompt);
    io::stdout().flush()?;
    read_confirmation(io::stdin().lock())
}

fn read_confirmation(mut input: impl BufRead) -> Result<bool> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let response = line.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}
