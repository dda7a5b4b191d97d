// hypermapper-cli/src/registry.rs
//
// Subcommand registry and top-level parser composition.
//
// Each registration contributes its own argument definitions (from its clap
// `Args` impl) as a named sub-parser, so flags and help are written once in
// the subcommand module. The composed parser adds only `-v/--version`.

use crate::cli::{PROGRAM, TaskArgs, VERSION};
use crate::commands::{Task, run_task};

use clap::{Arg, ArgAction, ArgMatches, Command};
use hypermapper_core::{CoreError, CoreResult, RunContext};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fmt;
use std::sync::Arc;

/// Entry function of a subcommand.
pub type EntryFn = fn(&TaskArgs, &RunContext<'_>) -> anyhow::Result<()>;

type AugmentFn = fn(Command) -> Command;
type ParseFn = fn(&ArgMatches) -> Result<TaskArgs, clap::Error>;

/// Static description of one subcommand.
#[derive(Clone)]
pub struct Registration {
    name: &'static str,
    about: &'static str,
    usage: Option<&'static str>,
    augment: AugmentFn,
    parse: ParseFn,
    entry: EntryFn,
}

fn parse_as<T: Task>(matches: &ArgMatches) -> Result<TaskArgs, clap::Error> {
    T::from_arg_matches(matches).map(T::into_task_args)
}

impl Registration {
    /// Registers `T` under its own name with its own entry point.
    pub fn of<T: Task>() -> Self {
        Self::new::<T>(T::NAME, T::ABOUT, run_task::<T>).with_usage(T::USAGE)
    }

    /// Registers `T`'s arguments under `name` with an arbitrary entry point.
    pub fn new<T: Task>(name: &'static str, about: &'static str, entry: EntryFn) -> Self {
        Self {
            name,
            about,
            usage: None,
            augment: <T as clap::Args>::augment_args,
            parse: parse_as::<T>,
            entry,
        }
    }

    pub fn with_usage(mut self, usage: Option<&'static str>) -> Self {
        self.usage = usage;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn about(&self) -> &'static str {
        self.about
    }

    pub fn entry(&self) -> EntryFn {
        self.entry
    }

    fn command(&self) -> Command {
        let command = (self.augment)(Command::new(self.name).about(self.about));
        match self.usage {
            Some(usage) => command.override_usage(usage),
            None => command,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("about", &self.about)
            .finish_non_exhaustive()
    }
}

/// A parsed subcommand invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    registration: Arc<Registration>,
    args: TaskArgs,
}

impl Invocation {
    pub fn name(&self) -> &'static str {
        self.registration.name
    }

    pub fn registration(&self) -> &Arc<Registration> {
        &self.registration
    }

    pub fn args(&self) -> &TaskArgs {
        &self.args
    }

    pub fn entry(&self) -> EntryFn {
        self.registration.entry
    }
}

/// Result of parsing a command line.
#[derive(Debug, Clone)]
pub enum Parsed {
    /// No subcommand was given.
    Interactive,
    Invoke(Invocation),
}

/// The set of subcommands known to the dispatcher.
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<Arc<Registration>>,
}

impl Registry {
    /// Builds a registry, failing if two registrations share a name.
    pub fn new<I>(registrations: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Registration>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for registration in registrations {
            if !seen.insert(registration.name) {
                return Err(CoreError::DuplicateSubcommand(registration.name.to_string()));
            }
            entries.push(Arc::new(registration));
        }
        Ok(Self { entries })
    }

    /// Registry holding the toolkit's own subcommands.
    pub fn builtin() -> CoreResult<Self> {
        Self::new(crate::commands::builtin())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Registration>> {
        self.entries.iter().find(|r| r.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Registration>> {
        self.entries.iter()
    }

    /// Composes the top-level parser.
    pub fn command(&self) -> Command {
        let root = Command::new(PROGRAM)
            .version(VERSION)
            .about("Neuroimaging toolkit: WMH segmentation, bias correction, QC and conversions")
            .long_about(
                "Dispatches to the toolkit's subcommands. Each run logs to <subject>/logs, \
                 <input dir>/logs or the working directory. Without a subcommand an \
                 interactive session starts.",
            )
            .disable_version_flag(true)
            .arg(
                Arg::new("version")
                    .short('v')
                    .long("version")
                    .action(ArgAction::Version)
                    .help("Print version"),
            );

        self.entries
            .iter()
            .fold(root, |root, registration| root.subcommand(registration.command()))
    }

    /// Parses `argv` (without the program name).
    pub fn parse<I, T>(&self, argv: I) -> Result<Parsed, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let argv = std::iter::once(OsString::from(PROGRAM)).chain(argv.into_iter().map(Into::into));
        let mut command = self.command();
        let matches = command.try_get_matches_from_mut(argv)?;

        let Some((name, sub_matches)) = matches.subcommand() else {
            return Ok(Parsed::Interactive);
        };

        let registration = self.get(name).cloned().ok_or_else(|| {
            command.error(
                clap::error::ErrorKind::InvalidSubcommand,
                format!("unrecognized subcommand '{name}'"),
            )
        })?;
        let args = (registration.parse)(sub_matches)?;

        Ok(Parsed::Invoke(Invocation { registration, args }))
    }
}
