//! Implementation of the 'bias_corr' subcommand.
//!
//! Runs ANTs N4 bias field correction on one image. With only a subject
//! directory, the raw T1 (`<subj>_T1.nii.gz`) is corrected into the
//! `<subj>_T1_nu.nii.gz` name the other subcommands expect.

use super::{Task, pick, prepare_output, require_input, subject_layout};
use crate::cli::TaskArgs;
use crate::error::CliErrorContext;

use clap::Args;
use hypermapper_core::subject::sibling_image;
use hypermapper_core::{LogLocation, RunContext, SubjectLayout, ToolInvocation};
use std::path::{Path, PathBuf};

/// Suffix of corrected images.
pub const CORRECTED_SUFFIX: &str = "_nu";

#[derive(Args, Debug, Clone, PartialEq)]
pub struct BiasCorrArgs {
    /// Subject directory; the raw T1 inside it is corrected when no image is given
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// Image to correct
    #[arg(short = 'i', long = "image", value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Corrected output (defaults to <image>_nu.nii.gz)
    #[arg(short = 'o', long = "out", value_name = "OUT")]
    pub out: Option<PathBuf>,

    /// Optional mask restricting the correction
    #[arg(short = 'm', long = "mask", value_name = "MASK")]
    pub mask: Option<PathBuf>,

    /// Image dimensionality
    #[arg(short = 'd', long = "dims", default_value_t = 3, value_parser = clap::value_parser!(u8).range(2..=4))]
    pub dims: u8,

    /// Shrink factor applied before fitting
    #[arg(long = "shrink", default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=8))]
    pub shrink: u8,

    /// Iterations per resolution level
    #[arg(long = "iters", default_value = "50x50x30x20", value_name = "AxBxC")]
    pub iters: String,

    /// Overwrite an existing output
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl LogLocation for BiasCorrArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.image.as_deref()
    }
}

impl Task for BiasCorrArgs {
    const NAME: &'static str = "bias_corr";
    const ABOUT: &'static str = "Bias field correct images using N4";

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::BiasCorr(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::BiasCorr(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        let layout = subject_layout(self.subj.as_deref())?;
        let image = pick(self.image.as_deref(), layout.as_ref(), SubjectLayout::t1w_raw)
            .cli_context("bias_corr needs --image or --subj")?;
        require_input(&image)?;
        if let Some(mask) = &self.mask {
            require_input(mask)?;
        }
        if !is_iteration_schedule(&self.iters) {
            anyhow::bail!("--iters must look like 50x50x30x20, got '{}'", self.iters);
        }

        let out = self
            .out
            .clone()
            .unwrap_or_else(|| sibling_image(&image, CORRECTED_SUFFIX));
        prepare_output(&out, self.force)?;

        let mut invocation = ToolInvocation::new(&ctx.tools().n4)
            .arg("-d")
            .arg(self.dims.to_string())
            .arg("-i")
            .arg(&image)
            .arg("-s")
            .arg(self.shrink.to_string())
            .arg("-c")
            .arg(format!("[{},1e-6]", self.iters));
        if let Some(mask) = &self.mask {
            invocation = invocation.arg("-x").arg(mask);
        }
        invocation = invocation.arg("-o").arg(&out);

        ctx.log().info(format_args!(
            "Correcting {} -> {}",
            image.display(),
            out.display()
        ));
        ctx.run_tool(&invocation)?;
        Ok(())
    }
}

fn is_iteration_schedule(value: &str) -> bool {
    !value.is_empty()
        && value
            .split('x')
            .all(|level| !level.is_empty() && level.bytes().all(|b| b.is_ascii_digit()))
}
