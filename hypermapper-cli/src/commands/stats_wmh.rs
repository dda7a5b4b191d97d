//! Implementation of the 'stats_wmh' subcommand.
//!
//! Summarises a WMH segmentation as a CSV of lesion volumes.

use super::{Task, pick, prepare_output, require_input, subject_layout};
use crate::cli::TaskArgs;
use crate::error::CliErrorContext;

use clap::Args;
use hypermapper_core::subject::image_stem;
use hypermapper_core::{LogLocation, RunContext, SubjectLayout, ToolInvocation};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, PartialEq)]
pub struct StatsWmhArgs {
    /// Subject directory; its pred/<subj>_wmh_seg.nii.gz is summarised
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// Segmentation to summarise
    #[arg(long = "seg", value_name = "SEG")]
    pub seg: Option<PathBuf>,

    /// Output CSV (defaults to <subj>/<subj>_wmh_seg_vol.csv or next to the segmentation)
    #[arg(short = 'o', long = "out", value_name = "CSV")]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl LogLocation for StatsWmhArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.seg.as_deref()
    }
}

impl Task for StatsWmhArgs {
    const NAME: &'static str = "stats_wmh";
    const ABOUT: &'static str = "Generates volumetric summary of WMH segmentations";

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::StatsWmh(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::StatsWmh(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        let layout = subject_layout(self.subj.as_deref())?;
        let seg = pick(self.seg.as_deref(), layout.as_ref(), SubjectLayout::wmh_seg)
            .cli_context("stats_wmh needs --seg or --subj")?;
        require_input(&seg)?;

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| default_output(&seg, layout.as_ref()));
        prepare_output(&out, self.force)?;

        let invocation = ToolInvocation::new(&ctx.tools().stats)
            .arg("--seg")
            .arg(&seg)
            .arg("--out")
            .arg(&out);
        ctx.run_tool(&invocation)?;
        ctx.log()
            .info(format_args!("Volumes written to {}", out.display()));
        Ok(())
    }
}

fn default_output(seg: &Path, layout: Option<&SubjectLayout>) -> PathBuf {
    let file = format!("{}_vol.csv", image_stem(seg));
    match (layout, seg.parent()) {
        (Some(layout), _) => layout.dir().join(file),
        (None, Some(dir)) => dir.join(file),
        (None, None) => PathBuf::from(file),
    }
}
