//! Implementation of the 'seg_wmh' subcommand.
//!
//! Segments white matter hyperintensities with the trained network. FLAIR is
//! required; T1 and T2 are passed along when available. Inference runs in
//! the external segmenter.

use super::{Task, pick, prepare_output, require_input, subject_layout};
use crate::cli::TaskArgs;
use crate::error::CliErrorContext;

use clap::Args;
use hypermapper_core::subject::sibling_image;
use hypermapper_core::{LogLocation, RunContext, SubjectLayout, ToolInvocation};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SegWmhArgs {
    /// Subject directory holding <subj>_T2_FLAIR_nu.nii.gz and friends
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// FLAIR image (bias corrected)
    #[arg(long = "flair", value_name = "FLAIR")]
    pub flair: Option<PathBuf>,

    /// T1-weighted image (bias corrected)
    #[arg(long = "t1w", value_name = "T1W")]
    pub t1w: Option<PathBuf>,

    /// T2-weighted image (bias corrected)
    #[arg(long = "t2w", value_name = "T2W")]
    pub t2w: Option<PathBuf>,

    /// Output segmentation (defaults to <subj>/pred/<subj>_wmh_seg.nii.gz)
    #[arg(short = 'o', long = "out", value_name = "OUT")]
    pub out: Option<PathBuf>,

    /// Probability threshold applied to the network output
    #[arg(long = "thr", default_value_t = 0.5, value_name = "0-1")]
    pub thr: f32,

    /// Skip reorienting inputs to the standard orientation
    #[arg(long = "ign-ort")]
    pub ign_ort: bool,

    /// Overwrite an existing output
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl LogLocation for SegWmhArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.t1w.as_deref().or(self.flair.as_deref())
    }
}

impl Task for SegWmhArgs {
    const NAME: &'static str = "seg_wmh";
    const ABOUT: &'static str = "Segment white matter hyperintensity (WMH) using a trained CNN";

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::SegWmh(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::SegWmh(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.thr) {
            anyhow::bail!("--thr must be between 0 and 1, got {}", self.thr);
        }

        let layout = subject_layout(self.subj.as_deref())?;
        let flair = pick(self.flair.as_deref(), layout.as_ref(), SubjectLayout::flair)
            .cli_context("seg_wmh needs --flair or --subj")?;
        require_input(&flair)?;

        // Optional modalities: explicit ones must exist, subject defaults
        // are only used when present.
        let t1w = optional_modality(self.t1w.as_deref(), layout.as_ref(), SubjectLayout::t1w)?;
        let t2w = optional_modality(self.t2w.as_deref(), layout.as_ref(), SubjectLayout::t2w)?;

        let out = match (&self.out, &layout) {
            (Some(out), _) => out.clone(),
            (None, Some(layout)) => layout.wmh_seg(),
            (None, None) => sibling_image(&flair, "_wmh_seg"),
        };
        prepare_output(&out, self.force)?;

        let mut invocation = ToolInvocation::new(&ctx.tools().segmenter)
            .arg("--flair")
            .arg(&flair);
        if let Some(t1w) = &t1w {
            invocation = invocation.arg("--t1w").arg(t1w);
        }
        if let Some(t2w) = &t2w {
            invocation = invocation.arg("--t2w").arg(t2w);
        }
        invocation = invocation
            .arg("--thr")
            .arg(self.thr.to_string())
            .arg("--out")
            .arg(&out);
        if self.ign_ort {
            invocation = invocation.arg("--ign-ort");
        }

        ctx.log().info(format_args!(
            "Segmenting WMH from {} ({} extra modalities)",
            flair.display(),
            usize::from(t1w.is_some()) + usize::from(t2w.is_some())
        ));
        ctx.run_tool(&invocation)?;
        ctx.log()
            .info(format_args!("Segmentation written to {}", out.display()));
        Ok(())
    }
}

fn optional_modality(
    explicit: Option<&Path>,
    layout: Option<&SubjectLayout>,
    default: fn(&SubjectLayout) -> PathBuf,
) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        require_input(path)?;
        return Ok(Some(path.to_path_buf()));
    }
    Ok(layout.map(default).filter(|p| p.exists()))
}
