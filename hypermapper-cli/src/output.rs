//! Terminal output helpers for the interactive session and error reporting.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Print a heading with colored styling and clear separation
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);

    println!("\n{}", line.bright_blue());
    println!("{}", format!(" {text} ").bold());
    println!("{}\n", line.bright_blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("{}: {}", label.bright_cyan(), value);
}

/// Print a success line
pub fn print_success(text: &str) {
    println!("{} {}", "[OK]".green(), text);
}

/// Print an error with its cause chain to stderr
pub fn print_error(err: &(dyn std::error::Error + 'static)) {
    eprintln!("{} {}", "Error:".red().bold(), err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", "caused by:".red(), cause);
        source = cause.source();
    }
}
