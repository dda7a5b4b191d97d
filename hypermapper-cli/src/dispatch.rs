// ============================================================================
// hypermapper-cli/src/dispatch.rs
// ============================================================================
//
// DISPATCHER: From a command line to a finished subcommand run
//
// Parsing goes through the registry. Without a subcommand the interactive
// front end runs once and nothing is logged. Otherwise the run log is
// routed and attached, the configured search paths are entered for the
// duration of the call, and the subcommand's entry function is invoked with
// a run context. Whatever the entry returns is propagated unchanged.

// ---- Internal crate imports ----
use crate::cli::{PROGRAM, VERSION};
use crate::error::{CliError, CliResult};
use crate::registry::{Invocation, Parsed, Registry};

// ---- Standard library imports ----
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Instant;

// ---- External crate imports ----
use hypermapper_core::{
    ProcessRunner, RunContext, RunLogger, SearchPaths, ToolRunner, ToolkitConfig,
    format_duration, get_timestamp, resolve_log_path, resolve_log_path_in,
};
use log::{debug, info};

/// What a dispatched command line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The interactive front end ran (or was already running).
    Interactive,
    /// A subcommand completed; its log is at `log_path`.
    Completed {
        command: &'static str,
        log_path: PathBuf,
    },
}

/// The dispatcher as seen from an interactive front end.
pub trait Session {
    /// Registered subcommands as `(name, about)`, in listing order.
    fn commands(&self) -> Vec<(&'static str, &'static str)>;

    /// Dispatches one command line (without the program name).
    fn submit(&mut self, argv: &[String]) -> CliResult<Outcome>;
}

/// Interactive front end started when no subcommand is given.
pub trait FrontEnd {
    fn run(&mut self, session: &mut dyn Session) -> CliResult<()>;
}

/// Parses command lines and runs the selected subcommand.
pub struct Dispatcher {
    registry: Registry,
    config: ToolkitConfig,
    search_paths: SearchPaths,
    runner: Box<dyn ToolRunner>,
    front_end: Option<Box<dyn FrontEnd>>,
    cwd: Option<PathBuf>,
}

impl Dispatcher {
    /// Dispatcher running real processes, with no front end attached.
    pub fn new(registry: Registry, config: ToolkitConfig) -> Self {
        Self {
            registry,
            config,
            search_paths: SearchPaths::new(),
            runner: Box::new(ProcessRunner),
            front_end: None,
            cwd: None,
        }
    }

    pub fn with_runner(mut self, runner: impl ToolRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn with_front_end(mut self, front_end: impl FrontEnd + 'static) -> Self {
        self.front_end = Some(Box::new(front_end));
        self
    }

    /// Directory used as the last-resort log location instead of the
    /// process working directory.
    pub fn with_cwd(mut self, cwd: PathBuf) -> Self {
        self.cwd = Some(cwd);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Search paths outside of any run.
    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Parses `argv` (without the program name) and acts on it.
    pub fn run<I, T>(&mut self, argv: I) -> CliResult<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.registry.parse(argv)? {
            Parsed::Interactive => self.interactive(),
            Parsed::Invoke(invocation) => self.invoke(&invocation),
        }
    }

    fn interactive(&mut self) -> CliResult<Outcome> {
        // Taken while the session runs, so an empty line submitted from
        // inside it does not start a second one.
        let Some(mut front_end) = self.front_end.take() else {
            debug!("No front end available; ignoring empty command line");
            return Ok(Outcome::Interactive);
        };
        let result = front_end.run(self);
        self.front_end = Some(front_end);
        result.map(|()| Outcome::Interactive)
    }

    fn invoke(&mut self, invocation: &Invocation) -> CliResult<Outcome> {
        let command = invocation.name();
        let log_path = match &self.cwd {
            Some(cwd) => resolve_log_path_in(command, invocation.args(), cwd)?,
            None => resolve_log_path(command, invocation.args())?,
        };
        let logger = RunLogger::attach(command, &log_path, &self.config.logging)?;

        logger.info(format_args!(
            "{PROGRAM} {VERSION} {command} started {}",
            get_timestamp()
        ));
        logger.debug(format_args!("Arguments: {:?}", invocation.args()));
        info!("Logging {} to {}", command, log_path.display());

        let started = Instant::now();
        let result = {
            let scope = self
                .search_paths
                .enter(self.config.search_paths.iter().cloned());
            let ctx = RunContext::new(
                command,
                &scope,
                &logger,
                self.runner.as_ref(),
                &self.config.tools,
            );
            (invocation.entry())(invocation.args(), &ctx)
        };
        let elapsed = format_duration(started.elapsed());

        match result {
            Ok(()) => {
                logger.info(format_args!("{command} finished in {elapsed}"));
                Ok(Outcome::Completed { command, log_path })
            }
            Err(e) => {
                logger.error(format_args!("{command} failed after {elapsed}: {e:#}"));
                Err(CliError::Task(e))
            }
        }
    }
}

impl Session for Dispatcher {
    fn commands(&self) -> Vec<(&'static str, &'static str)> {
        self.registry
            .iter()
            .map(|r| (r.name(), r.about()))
            .collect()
    }

    fn submit(&mut self, argv: &[String]) -> CliResult<Outcome> {
        self.run(argv.iter().cloned())
    }
}
