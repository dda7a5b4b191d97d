//! Implementation of the 'seg_qc' subcommand.
//!
//! Renders a tiled mosaic of a segmentation overlaid on a structural image.

use super::{Task, pick, prepare_output, require_input, subject_layout};
use crate::cli::TaskArgs;
use crate::error::CliErrorContext;

use clap::Args;
use hypermapper_core::subject::image_stem;
use hypermapper_core::{LogLocation, RunContext, SubjectLayout, ToolInvocation};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SegQcArgs {
    /// Subject directory; defaults the image to its FLAIR and the segmentation to pred/
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// Structural image shown underneath
    #[arg(short = 'i', long = "image", value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Segmentation drawn on top
    #[arg(long = "seg", value_name = "SEG")]
    pub seg: Option<PathBuf>,

    /// Output PNG (defaults to <subj>/qc/<seg>_qc.png or next to the segmentation)
    #[arg(short = 'o', long = "out", value_name = "PNG")]
    pub out: Option<PathBuf>,

    /// Number of slices in the mosaic
    #[arg(long = "slices", default_value_t = 6, value_parser = clap::value_parser!(u16).range(1..=64))]
    pub slices: u16,

    /// Overlay opacity
    #[arg(long = "alpha", default_value_t = 0.5, value_name = "0-1")]
    pub alpha: f32,

    /// Overwrite an existing output
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl LogLocation for SegQcArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.image.as_deref()
    }
}

impl Task for SegQcArgs {
    const NAME: &'static str = "seg_qc";
    const ABOUT: &'static str = "Create tiled mosaic of segmentation overlaid on structural image";

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::SegQc(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::SegQc(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            anyhow::bail!("--alpha must be between 0 and 1, got {}", self.alpha);
        }

        let layout = subject_layout(self.subj.as_deref())?;
        let image = pick(self.image.as_deref(), layout.as_ref(), SubjectLayout::flair)
            .cli_context("seg_qc needs --image or --subj")?;
        let seg = pick(self.seg.as_deref(), layout.as_ref(), SubjectLayout::wmh_seg)
            .cli_context("seg_qc needs --seg or --subj")?;
        require_input(&image)?;
        require_input(&seg)?;

        let out = self.out.clone().unwrap_or_else(|| default_output(&seg, layout.as_ref()));
        prepare_output(&out, self.force)?;

        let invocation = ToolInvocation::new(&ctx.tools().mosaic)
            .arg("--image")
            .arg(&image)
            .arg("--seg")
            .arg(&seg)
            .arg("--slices")
            .arg(self.slices.to_string())
            .arg("--alpha")
            .arg(self.alpha.to_string())
            .arg("--out")
            .arg(&out);

        ctx.run_tool(&invocation)?;
        ctx.log().info(format_args!("QC mosaic written to {}", out.display()));
        Ok(())
    }
}

fn default_output(seg: &Path, layout: Option<&SubjectLayout>) -> PathBuf {
    let file = format!("{}_qc.png", image_stem(seg));
    match (layout, seg.parent()) {
        (Some(layout), _) => layout.qc_dir().join(file),
        (None, Some(dir)) => dir.join(file),
        (None, None) => PathBuf::from(file),
    }
}
