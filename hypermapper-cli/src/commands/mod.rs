//! Command implementations for the CLI.
//!
//! Each submodule defines one subcommand: its clap argument struct and the
//! work it does when invoked. The image processing itself happens in an
//! external tool; the modules resolve inputs and outputs, then call it
//! through the run context.

/// N4 bias field correction.
pub mod bias_corr;
/// Analyze to NIfTI conversion.
pub mod filetype;
/// QC mosaic of a segmentation over a structural image.
pub mod seg_qc;
/// WMH segmentation with the trained network.
pub mod seg_wmh;
/// Volumetric summary of WMH segmentations.
pub mod stats_wmh;
/// Trim or expand an image into a reference space.
pub mod trim_like;

pub use bias_corr::BiasCorrArgs;
pub use filetype::FiletypeArgs;
pub use seg_qc::SegQcArgs;
pub use seg_wmh::SegWmhArgs;
pub use stats_wmh::StatsWmhArgs;
pub use trim_like::TrimLikeArgs;

use crate::cli::TaskArgs;
use crate::error::CliErrorContext;
use crate::registry::Registration;

use hypermapper_core::{CoreError, CoreResult, RunContext, SubjectLayout};
use std::fs;
use std::path::{Path, PathBuf};

/// A subcommand: argument surface plus entry point.
pub trait Task: clap::Args + std::fmt::Debug + 'static {
    /// Canonical subcommand name.
    const NAME: &'static str;

    /// One-line help shown in the top-level listing.
    const ABOUT: &'static str;

    /// Usage line replacing the generated one, if any.
    const USAGE: Option<&'static str> = None;

    fn into_task_args(self) -> TaskArgs;

    fn from_task_args(args: &TaskArgs) -> Option<&Self>;

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()>;
}

/// Entry function used by the built-in registrations.
pub fn run_task<T: Task>(args: &TaskArgs, ctx: &RunContext<'_>) -> anyhow::Result<()> {
    let task = T::from_task_args(args)
        .cli_with_context(|| format!("arguments do not belong to '{}'", T::NAME))?;
    task.run(ctx)
}

/// The six toolkit subcommands, in listing order.
pub fn builtin() -> Vec<Registration> {
    vec![
        Registration::of::<SegWmhArgs>(),
        Registration::of::<SegQcArgs>(),
        Registration::of::<BiasCorrArgs>(),
        Registration::of::<FiletypeArgs>(),
        Registration::of::<StatsWmhArgs>(),
        Registration::of::<TrimLikeArgs>(),
    ]
}

// ============================================================================
// SHARED HELPERS
// ============================================================================

/// Layout for the subject directory, when one was given.
pub(crate) fn subject_layout(subject: Option<&Path>) -> CoreResult<Option<SubjectLayout>> {
    subject
        .filter(|s| !s.as_os_str().is_empty())
        .map(SubjectLayout::new)
        .transpose()
}

/// Explicit path, else the subject default.
pub(crate) fn pick(
    explicit: Option<&Path>,
    layout: Option<&SubjectLayout>,
    default: impl FnOnce(&SubjectLayout) -> PathBuf,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| layout.map(default))
}

/// Fails unless `path` exists.
pub(crate) fn require_input(path: &Path) -> CoreResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(CoreError::InputNotFound(path.to_path_buf()))
    }
}

/// Refuses to clobber `path` unless forced, and creates its directory.
pub(crate) fn prepare_output(path: &Path, force: bool) -> CoreResult<()> {
    if path.exists() && !force {
        return Err(CoreError::OutputExists(path.to_path_buf()));
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}
