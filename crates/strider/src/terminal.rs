//! Styled status output for CLI commands.

use console::style;

/// Print a success line to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

/// Print a failure line to stderr.
pub fn failure(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print a warning line to stderr.
pub fn warning(message: &str) {
    eprintln!("{} {}", style("!").yellow().bold(), message);
}

/// Print a dimmed section header to stderr.
pub fn header(title: &str) {
    eprintln!("{}", style(title).dim());
}
