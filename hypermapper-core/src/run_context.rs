//! Scoped search path and the per-invocation run context.
//!
//! The search path is a plain value owned by whoever dispatches subcommands.
//! Entering a scope appends locations and hands back a guard; dropping the
//! guard restores the list to exactly what it was before, whether the scope
//! ends by return, `?` or a panic unwinding through it. Nothing here touches
//! the process environment: external tools see the list through the child
//! process `PATH` built by [`crate::external`].

use crate::config::ToolCommands;
use crate::error::CoreResult;
use crate::external::{ToolInvocation, ToolOutput, ToolRunner};
use crate::log_router::RunLogger;

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

/// Ordered list of directories searched for external tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPaths {
    entries: Vec<PathBuf>,
}

impl SearchPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.iter().any(|p| p == path)
    }

    /// Appends a single entry outside of any scope.
    pub fn push(&mut self, path: PathBuf) {
        self.entries.push(path);
    }

    /// Appends `extra` until the returned guard is dropped.
    pub fn enter<I>(&mut self, extra: I) -> SearchPathScope<'_>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let saved = self.entries.clone();
        self.entries.extend(extra);
        SearchPathScope { paths: self, saved }
    }

    /// Runs `f` with `extra` appended, restoring the list afterwards.
    pub fn scoped<I, R, F>(&mut self, extra: I, f: F) -> R
    where
        I: IntoIterator<Item = PathBuf>,
        F: FnOnce(&SearchPaths) -> R,
    {
        let scope = self.enter(extra);
        f(&scope)
    }
}

impl From<Vec<PathBuf>> for SearchPaths {
    fn from(entries: Vec<PathBuf>) -> Self {
        Self { entries }
    }
}

/// Guard returned by [`SearchPaths::enter`].
///
/// Derefs to the augmented list, so scopes can nest:
/// `paths.enter(a)` then `scope.enter(b)` on the guard.
#[must_use = "the search path is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct SearchPathScope<'a> {
    paths: &'a mut SearchPaths,
    saved: Vec<PathBuf>,
}

impl Deref for SearchPathScope<'_> {
    type Target = SearchPaths;

    fn deref(&self) -> &SearchPaths {
        self.paths
    }
}

impl DerefMut for SearchPathScope<'_> {
    fn deref_mut(&mut self) -> &mut SearchPaths {
        self.paths
    }
}

impl Drop for SearchPathScope<'_> {
    fn drop(&mut self) {
        // Restore the snapshot rather than popping what we appended, so any
        // mutation made through the guard is undone too.
        self.paths.entries = std::mem::take(&mut self.saved);
    }
}

/// Everything a subcommand receives besides its own arguments.
pub struct RunContext<'a> {
    command: &'a str,
    search_paths: &'a SearchPaths,
    logger: &'a RunLogger,
    runner: &'a dyn ToolRunner,
    tools: &'a ToolCommands,
}

impl<'a> RunContext<'a> {
    pub fn new(
        command: &'a str,
        search_paths: &'a SearchPaths,
        logger: &'a RunLogger,
        runner: &'a dyn ToolRunner,
        tools: &'a ToolCommands,
    ) -> Self {
        Self {
            command,
            search_paths,
            logger,
            runner,
            tools,
        }
    }

    /// Canonical name of the running subcommand.
    pub fn command(&self) -> &str {
        self.command
    }

    pub fn search_paths(&self) -> &SearchPaths {
        self.search_paths
    }

    /// The run log for this invocation.
    pub fn log(&self) -> &RunLogger {
        self.logger
    }

    pub fn tools(&self) -> &ToolCommands {
        self.tools
    }

    /// Runs an external tool with this context's search paths and copies its
    /// output into the run log.
    pub fn run_tool(&self, invocation: &ToolInvocation) -> CoreResult<ToolOutput> {
        self.logger.info(format_args!("Running: {}", invocation.display()));
        let output = self.runner.run(invocation, self.search_paths.as_slice())?;
        for line in output.stdout.lines().filter(|l| !l.trim().is_empty()) {
            self.logger.info(format_args!("[{}] {}", invocation.program, line));
        }
        for line in output.stderr.lines().filter(|l| !l.trim().is_empty()) {
            self.logger.info(format_args!("[{} stderr] {}", invocation.program, line));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogSettings;
    use std::fs;
    use std::panic::{self, AssertUnwindSafe};
    use tempfile::tempdir;

    /// Runner answering every call with fixed output.
    struct CannedRunner {
        stdout: &'static str,
        stderr: &'static str,
    }

    impl ToolRunner for CannedRunner {
        fn run(&self, _: &ToolInvocation, _: &[PathBuf]) -> CoreResult<ToolOutput> {
            Ok(ToolOutput {
                stdout: self.stdout.to_string(),
                stderr: self.stderr.to_string(),
            })
        }
    }

    fn base() -> SearchPaths {
        SearchPaths::from(vec![PathBuf::from("/usr/local/bin")])
    }

    #[test]
    fn scope_appends_then_restores() {
        let mut paths = base();
        {
            let scope = paths.enter([PathBuf::from("/opt/hm/bin")]);
            assert_eq!(scope.len(), 2);
            assert!(scope.contains(Path::new("/opt/hm/bin")));
        }
        assert_eq!(paths, base());
    }

    #[test]
    fn scope_restores_when_wrapped_call_fails() {
        let mut paths = base();
        let result: Result<(), String> = paths.scoped([PathBuf::from("/opt/hm/bin")], |p| {
            assert_eq!(p.len(), 2);
            Err("segmentation failed".to_string())
        });
        assert!(result.is_err());
        assert_eq!(paths, base());
    }

    #[test]
    fn scope_restores_when_wrapped_call_panics() {
        let mut paths = base();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let _scope = paths.enter([PathBuf::from("/opt/hm/bin")]);
            panic!("boom");
        }));
        assert!(outcome.is_err());
        assert_eq!(paths, base());
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut paths = base();
        {
            let mut outer = paths.enter([PathBuf::from("/a")]);
            {
                let inner = outer.enter([PathBuf::from("/b")]);
                assert_eq!(inner.len(), 3);
            }
            assert_eq!(outer.len(), 2);
            assert!(!outer.contains(Path::new("/b")));
        }
        assert_eq!(paths, base());
    }

    #[test]
    fn mutation_through_guard_is_undone() {
        let mut paths = base();
        {
            let mut scope = paths.enter(Vec::new());
            scope.push(PathBuf::from("/stray"));
        }
        assert_eq!(paths, base());
    }

    #[test]
    fn tool_output_reaches_run_log_at_default_level() -> CoreResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("stats_wmh.log");
        let settings = LogSettings {
            console: false,
            ..LogSettings::default()
        };
        let logger = RunLogger::attach("stats_wmh", &path, &settings)?;
        let runner = CannedRunner {
            stdout: "lesion volume 12.3 ml\n",
            stderr: "\nn4 converged\n",
        };
        let tools = ToolCommands::default();
        let paths = SearchPaths::new();
        let ctx = RunContext::new("stats_wmh", &paths, &logger, &runner, &tools);

        ctx.run_tool(&ToolInvocation::new("hypermapper-stats"))?;
        logger.flush();

        let text = fs::read_to_string(&path)?;
        assert!(text.contains("[hypermapper-stats] lesion volume 12.3 ml"), "log was: {text}");
        assert!(text.contains("[hypermapper-stats stderr] n4 converged"), "log was: {text}");
        Ok(())
    }
}
