//! Test doubles shared by the command and dispatcher tests.

use hypermapper_core::config::{ToolkitConfig, ToolkitConfigBuilder};
use hypermapper_core::{
    CoreError, CoreResult, RunContext, RunLogger, SearchPaths, ToolInvocation, ToolOutput,
    ToolRunner,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Records invocations instead of spawning processes.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Rc<RefCell<Vec<(ToolInvocation, Vec<PathBuf>)>>>,
    fail_with_status: Option<i32>,
}

impl RecordingRunner {
    pub fn failing(status: i32) -> Self {
        Self {
            fail_with_status: Some(status),
            ..Self::default()
        }
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.calls.borrow().iter().map(|(inv, _)| inv.clone()).collect()
    }

    pub fn search_paths_seen(&self) -> Vec<Vec<PathBuf>> {
        self.calls.borrow().iter().map(|(_, p)| p.clone()).collect()
    }
}

impl ToolRunner for RecordingRunner {
    fn run(&self, invocation: &ToolInvocation, search_paths: &[PathBuf]) -> CoreResult<ToolOutput> {
        self.calls
            .borrow_mut()
            .push((invocation.clone(), search_paths.to_vec()));
        match self.fail_with_status {
            Some(status) => Err(CoreError::ToolFailed {
                tool: invocation.program.clone(),
                status: status.to_string(),
                stderr: "recorded failure".to_string(),
            }),
            None => Ok(ToolOutput::default()),
        }
    }
}

/// Quiet configuration with no search paths.
pub fn test_config() -> ToolkitConfig {
    ToolkitConfigBuilder::new().log_console(false).build()
}

/// Runs `f` with a context logging to `<dir>/<command>.log`.
pub fn with_context<R>(
    dir: &Path,
    command: &str,
    runner: &RecordingRunner,
    f: impl FnOnce(&RunContext<'_>) -> R,
) -> R {
    let config = test_config();
    let logger = RunLogger::attach(command, &dir.join(format!("{command}.log")), &config.logging)
        .unwrap_or_else(|e| panic!("cannot open test log: {e}"));
    let paths = SearchPaths::new();
    let ctx = RunContext::new(command, &paths, &logger, runner, &config.tools);
    f(&ctx)
}

/// Invocation arguments as plain strings.
pub fn arg_strings(invocation: &ToolInvocation) -> Vec<String> {
    invocation
        .args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}
