// hypermapper-cli/src/lib.rs
//
// Library portion of the Hypermapper CLI application.
// Contains the subcommand registry, argument definitions, the dispatcher and
// the interactive front end.

pub mod cli;
pub mod commands;
pub mod dispatch;
pub mod error;
pub mod interactive;
pub mod output;
pub mod registry;

#[cfg(test)]
mod testing;

// Re-export items needed by the binary or integration tests
pub use cli::{PROGRAM, TaskArgs, VERSION};
pub use dispatch::{Dispatcher, FrontEnd, Outcome, Session};
pub use error::{CliError, CliResult};
pub use interactive::ConsoleFrontEnd;
pub use registry::{Invocation, Parsed, Registration, Registry};
