// ============================================================================
// hypermapper-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Running the programs that do the actual image work
//
// Segmentation, N4 correction, conversion, mosaics and volumetric summaries
// are all performed by external executables. This module describes such an
// invocation, resolves the executable against the run's search paths, and
// runs it through the `ToolRunner` trait so tests can substitute a recorder.

// ---- Internal crate imports ----
use crate::error::{CoreError, CoreResult};

// ---- Standard library imports ----
use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

// ---- External crate imports ----
use log::debug;

/// Environment handed to every child to keep TensorFlow's native logging quiet.
pub const QUIET_TF_ENV: (&str, &str) = ("TF_CPP_MIN_LOG_LEVEL", "3");

/// Number of trailing stderr lines kept in a `ToolFailed` error.
const STDERR_TAIL_LINES: usize = 20;

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<OsString>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Human-readable command line for logs.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes tool invocations.
pub trait ToolRunner {
    /// Runs `invocation`, searching `search_paths` before the inherited
    /// `PATH`. A non-zero exit status is an error.
    fn run(&self, invocation: &ToolInvocation, search_paths: &[PathBuf]) -> CoreResult<ToolOutput>;
}

/// Finds `program` in `search_paths`, then in the inherited `PATH`.
///
/// Programs given with a directory component are returned unchanged when
/// they are executable. Files without execute permission are skipped.
pub fn locate_tool(program: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let as_path = Path::new(program);
    if as_path.components().count() > 1 {
        return is_executable(as_path).then(|| as_path.to_path_buf());
    }

    let inherited = env::var_os("PATH")
        .map(|p| env::split_paths(&p).collect::<Vec<_>>())
        .unwrap_or_default();

    search_paths
        .iter()
        .chain(inherited.iter())
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// `PATH` value for a child: the search paths, then the inherited `PATH`.
pub fn child_path(search_paths: &[PathBuf]) -> CoreResult<OsString> {
    let inherited = env::var_os("PATH").unwrap_or_default();
    let entries = search_paths
        .iter()
        .cloned()
        .chain(env::split_paths(&inherited));
    env::join_paths(entries)
        .map_err(|e| CoreError::OperationFailed(format!("Invalid search path entry: {e}")))
}

/// Runs tools as child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation, search_paths: &[PathBuf]) -> CoreResult<ToolOutput> {
        let program = locate_tool(&invocation.program, search_paths)
            .ok_or_else(|| CoreError::ToolNotFound(invocation.program.clone()))?;

        debug!("Spawning {} as {}", invocation.program, program.display());

        let output = Command::new(&program)
            .args(&invocation.args)
            .env("PATH", child_path(search_paths)?)
            .env(QUIET_TF_ENV.0, QUIET_TF_ENV.1)
            .stdin(Stdio::null())
            .output()?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(CoreError::ToolFailed {
                tool: invocation.program.clone(),
                status,
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn display_joins_arguments() {
        let inv = ToolInvocation::new("c3d").arg("in.img").args(["-o", "out.nii.gz"]);
        assert_eq!(inv.display(), "c3d in.img -o out.nii.gz");
    }

    #[test]
    fn search_paths_win_over_inherited_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let tool = dir.path().join("hypermapper-test-tool-xyz");
        fs::write(&tool, "")?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tool, fs::Permissions::from_mode(0o755))?;
        }

        let found = locate_tool("hypermapper-test-tool-xyz", &[dir.path().to_path_buf()]);
        assert_eq!(found, Some(tool));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn non_executable_files_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let plain = dir.path().join("plain");
        let runnable = dir.path().join("runnable");
        fs::create_dir(&plain)?;
        fs::create_dir(&runnable)?;

        let stray = plain.join("hypermapper-test-tool-xyz");
        fs::write(&stray, "not a program")?;
        fs::set_permissions(&stray, fs::Permissions::from_mode(0o644))?;
        let tool = runnable.join("hypermapper-test-tool-xyz");
        fs::write(&tool, "#!/bin/sh\n")?;
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755))?;

        let found = locate_tool("hypermapper-test-tool-xyz", &[plain.clone(), runnable]);
        assert_eq!(found, Some(tool));

        let direct = stray.display().to_string();
        assert_eq!(locate_tool(&direct, &[]), None);
        Ok(())
    }

    #[test]
    fn missing_tool_is_none() {
        assert_eq!(locate_tool("definitely-not-a-real-tool-8812", &[]), None);
    }

    #[test]
    fn missing_tool_reports_not_found() {
        let err = ProcessRunner
            .run(&ToolInvocation::new("definitely-not-a-real-tool-8812"), &[])
            .unwrap_err();
        assert!(matches!(err, CoreError::ToolNotFound(name) if name == "definitely-not-a-real-tool-8812"));
    }

    #[test]
    fn child_path_prepends_search_paths() -> CoreResult<()> {
        let joined = child_path(&[PathBuf::from("/opt/hm/bin")])?;
        let first = env::split_paths(&joined).next();
        assert_eq!(first, Some(PathBuf::from("/opt/hm/bin")));
        Ok(())
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_carries_status_and_stderr() -> Result<(), Box<dyn std::error::Error>> {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir()?;
        let script = dir.path().join("fails");
        fs::write(&script, "#!/bin/sh\necho 'cannot read image' >&2\nexit 3\n")?;
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))?;

        let err = ProcessRunner
            .run(&ToolInvocation::new("fails"), &[dir.path().to_path_buf()])
            .unwrap_err();
        match err {
            CoreError::ToolFailed { status, stderr, .. } => {
                assert_eq!(status, "3");
                assert!(stderr.contains("cannot read image"));
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    }
}
