// ============================================================================
// hypermapper-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Error types shared by the core library and the CLI
//
// Every fallible core operation returns `CoreResult<T>`. Subcommand failures
// that originate outside the core travel as `anyhow::Error` and are never
// folded into this enum.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the core library.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to set up log file '{}': {source}", path.display())]
    LogSetup {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read configuration file '{}': {source}", path.display())]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("Subcommand '{0}' is registered more than once")]
    DuplicateSubcommand(String),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Output already exists: {} (use --force to overwrite)", .0.display())]
    OutputExists(PathBuf),

    #[error("Required tool '{0}' was not found in the search paths or PATH")]
    ToolNotFound(String),

    #[error("Tool '{tool}' exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("{0}")]
    OperationFailed(String),
}

/// Result type for core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
