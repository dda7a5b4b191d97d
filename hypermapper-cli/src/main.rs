// hypermapper-cli/src/main.rs
//
// Entry point of the `hypermapper` binary.
//
// Responsibilities:
// - Initialising console logging (env_logger, RUST_LOG).
// - Loading the toolkit configuration (HYPERMAPPER_CONFIG and friends).
// - Building the subcommand registry and the dispatcher.
// - Mapping the outcome to a process exit code: clap decides for usage,
//   help and version; any other failure exits with 1.

use hypermapper_cli::output::print_error;
use hypermapper_cli::{CliError, ConsoleFrontEnd, Dispatcher, Registry};
use hypermapper_core::ToolkitConfig;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();

    let dispatcher = ToolkitConfig::load(None)
        .and_then(|config| Registry::builtin().map(|registry| Dispatcher::new(registry, config)));

    let mut dispatcher = match dispatcher {
        Ok(dispatcher) => dispatcher.with_front_end(ConsoleFrontEnd::new()),
        Err(e) => {
            print_error(&e);
            process::exit(1);
        }
    };

    match dispatcher.run(std::env::args_os().skip(1)) {
        Ok(_) => {}
        Err(CliError::Parse(e)) => e.exit(),
        Err(e) => {
            log::debug!("Exiting after error: {e:?}");
            print_error(&e);
            process::exit(1);
        }
    }
}
