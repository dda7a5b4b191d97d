//! Log routing: where a run's log file lives, and the logger writing to it.
//!
//! The location is derived from the subcommand name and the arguments:
//!
//! 1. a non-empty subject directory wins: `<subject>/logs/<command>.log`
//! 2. else a non-empty primary input: `<input dir>/logs/<command>.log`
//! 3. else the working directory: `<cwd>/<command>.log`
//!
//! Each invocation gets its own [`RunLogger`], a `log4rs` logger instance
//! that is never installed as the global logger. Repeated invocations in
//! one process therefore never stack handlers on a shared logger.

use crate::config::LogSettings;
use crate::error::{CoreError, CoreResult};

use log::{Level, LevelFilter, Log, Record};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        file::FileAppender,
    },
    config::{Appender, Config, Root},
    encode::pattern::PatternEncoder,
};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Line format of run logs: timestamp, then the message. [`RunLogger`]
/// prefixes each message with its level name padded to 8.
pub const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S,%3f)} {m}{n}";

/// Level names as they appear in run logs.
fn level_name(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

/// Directory created under a subject or input directory for run logs.
pub const LOGS_DIR: &str = "logs";

/// Arguments that can place a run log.
///
/// Implemented by the parsed arguments of every subcommand.
pub trait LogLocation {
    /// Subject directory, when the subcommand was pointed at one.
    fn subject(&self) -> Option<&Path>;

    /// The chief image or file the subcommand operates on.
    fn primary_input(&self) -> Option<&Path>;
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Computes the log path for `command` relative to `cwd` without touching
/// the filesystem.
pub fn log_path_for(command: &str, args: &dyn LogLocation, cwd: &Path) -> PathBuf {
    let file_name = format!("{command}.log");

    if let Some(subject) = non_empty(args.subject()) {
        return cwd.join(subject).join(LOGS_DIR).join(file_name);
    }

    if let Some(input) = non_empty(args.primary_input()) {
        let dir = input.parent().unwrap_or_else(|| Path::new(""));
        return cwd.join(dir).join(LOGS_DIR).join(file_name);
    }

    cwd.join(file_name)
}

/// Resolves the log path against `cwd` and creates its directory.
pub fn resolve_log_path_in(command: &str, args: &dyn LogLocation, cwd: &Path) -> CoreResult<PathBuf> {
    let path = log_path_for(command, args, cwd);
    let dir = path.parent().ok_or_else(|| CoreError::LogSetup {
        path: path.clone(),
        source: anyhow::anyhow!("log path has no parent directory"),
    })?;

    fs::create_dir_all(dir).map_err(|e| CoreError::LogSetup {
        path: path.clone(),
        source: e.into(),
    })?;

    Ok(path)
}

/// Resolves the log path against the current working directory and creates
/// its directory.
pub fn resolve_log_path(command: &str, args: &dyn LogLocation) -> CoreResult<PathBuf> {
    let cwd = env::current_dir()?;
    resolve_log_path_in(command, args, &cwd)
}

/// Logger owned by a single invocation.
pub struct RunLogger {
    inner: log4rs::Logger,
    level: LevelFilter,
    path: PathBuf,
    target: String,
}

impl RunLogger {
    /// Opens `path` (appending or truncating per `settings`) and builds a
    /// logger writing to it, plus stderr when `settings.console` is set.
    pub fn attach(command: &str, path: &Path, settings: &LogSettings) -> CoreResult<Self> {
        let level = settings.level_filter()?;
        let setup_err = |source: anyhow::Error| CoreError::LogSetup {
            path: path.to_path_buf(),
            source,
        };

        let file_appender = FileAppender::builder()
            .append(settings.append)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build(path)
            .map_err(|e| setup_err(e.into()))?;

        let mut builder =
            Config::builder().appender(Appender::builder().build("file", Box::new(file_appender)));
        let mut root = Root::builder().appender("file");

        if settings.console {
            let console = ConsoleAppender::builder()
                .target(Target::Stderr)
                .encoder(Box::new(PatternEncoder::new("{m}{n}")))
                .build();
            builder = builder.appender(Appender::builder().build("console", Box::new(console)));
            root = root.appender("console");
        }

        let config = builder
            .build(root.build(level))
            .map_err(|e| setup_err(anyhow::anyhow!(e.to_string())))?;

        Ok(Self {
            inner: log4rs::Logger::new(config),
            level,
            path: path.to_path_buf(),
            target: command.to_string(),
        })
    }

    /// The file this logger writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if level > self.level {
            return;
        }
        self.inner.log(
            &Record::builder()
                .args(format_args!("{:<8} {}", level_name(level), args))
                .level(level)
                .target(&self.target)
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }

    pub fn flush(&self) {
        self.inner.flush();
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.inner.flush();
    }
}

impl fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLogger")
            .field("path", &self.path)
            .field("level", &self.level)
            .finish()
    }
}
