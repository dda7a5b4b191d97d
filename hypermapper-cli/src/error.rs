// ============================================================================
// hypermapper-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error types and utilities for the CLI
//
// Parse errors stay clap errors so `main` can let clap print usage and pick
// the exit code. Subcommand failures are carried unchanged as anyhow errors.

// ---- Internal crate imports ----
use hypermapper_core::CoreError;

// ---- Standard library imports ----
use std::fmt;

// ---- External crate imports ----
use thiserror::Error;

/// Errors surfaced by the dispatcher.
#[derive(Error, Debug)]
pub enum CliError {
    /// Bad usage, `--help` or `--version`.
    #[error(transparent)]
    Parse(#[from] clap::Error),

    /// Startup or run setup failure (duplicate registration, log directory).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Failure raised inside a subcommand's entry function.
    #[error(transparent)]
    Task(anyhow::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for CLI results.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// ERROR CONVERSION UTILITIES
// ============================================================================

/// Extension trait for turning a missing value into a `CoreError` with a
/// message, for use inside subcommands.
pub trait CliErrorContext<T> {
    /// Add context to an error.
    fn cli_context<C>(self, context: C) -> Result<T, CoreError>
    where
        C: fmt::Display;

    /// Add context using a closure (for lazy evaluation).
    fn cli_with_context<C, F>(self, f: F) -> Result<T, CoreError>
    where
        C: fmt::Display,
        F: FnOnce() -> C;
}

impl<T> CliErrorContext<T> for Option<T> {
    fn cli_context<C>(self, context: C) -> Result<T, CoreError>
    where
        C: fmt::Display,
    {
        self.ok_or_else(|| CoreError::OperationFailed(context.to_string()))
    }

    fn cli_with_context<C, F>(self, f: F) -> Result<T, CoreError>
    where
        C: fmt::Display,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| CoreError::OperationFailed(f().to_string()))
    }
}
