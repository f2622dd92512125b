//! Formatting functions for CLI output.
//!
//! Status goes to stdout, errors and warnings to stderr. Styling is dropped
//! automatically when the stream is not a terminal.

use console::style;

use crate::boundary::BoundaryWarning;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), warning);
}

/// Tell the user how to set up a global identity.
pub fn display_identity_hint() {
    eprintln!(
        "\n{} Configure a global identity, then retry:",
        style("→").yellow()
    );
    for command in identity_commands() {
        eprintln!("  {}", style(command).cyan());
    }
}

fn identity_commands() -> [&'static str; 2] {
    [
        "git config --global user.name \"Your Name\"",
        "git config --global user.email \"you@example.com\"",
    ]
}

pub fn display_list(title: &str, items: &[String]) {
    println!("{}", style(title).bold());
    if items.is_empty() {
        println!("  (none)");
        return;
    }
    for item in items {
        println!("  {}", item);
    }
}

/// Print captured git output, indented under the previous message.
pub fn display_output(lines: &[String]) {
    for line in lines.iter().filter(|line| !line.trim().is_empty()) {
        eprintln!("    {}", style(line).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_commands_cover_name_and_email() {
        let commands = identity_commands();
        assert!(commands[0].contains("user.name"));
        assert!(commands[1].contains("user.email"));
    }

    #[test]
    fn test_display_functions() {
        // Visual verification test - output is printed to stdout/stderr
        display_error("test error");
        display_success("test success");
        display_status("test status");
        display_boundary_warning(&BoundaryWarning::NoCurrentTag);
        display_list("Tags:", &["1.0.0".to_string()]);
        display_list("Tags:", &[]);
        display_output(&["fatal: something".to_string(), String::new()]);
    }
}
