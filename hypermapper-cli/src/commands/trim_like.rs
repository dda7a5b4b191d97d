//! Implementation of the 'trim_like' subcommand.
//!
//! Reslices an image into the grid of a reference image, trimming or
//! padding it so both share one voxel space.

use super::{Task, prepare_output, require_input};
use crate::cli::TaskArgs;

use clap::{Args, ValueEnum};
use hypermapper_core::{LogLocation, RunContext, ToolInvocation};
use std::path::{Path, PathBuf};

/// Interpolation used while reslicing.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Nearest neighbour, for label images
    Nearest,
    #[default]
    Linear,
    Cubic,
}

impl Interpolation {
    fn converter_name(self) -> &'static str {
        match self {
            Self::Nearest => "NearestNeighbor",
            Self::Linear => "Linear",
            Self::Cubic => "Cubic",
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TrimLikeArgs {
    /// Image to trim or expand
    #[arg(short = 'i', long = "image", value_name = "IMG", required = true)]
    pub image: PathBuf,

    /// Reference image defining the target space
    #[arg(short = 'r', long = "ref", value_name = "REF", required = true)]
    pub reference: PathBuf,

    /// Output image
    #[arg(short = 'o', long = "out", value_name = "OUT", required = true)]
    pub out: PathBuf,

    /// Interpolation method
    #[arg(long = "interp", value_enum, default_value_t = Interpolation::Linear)]
    pub interp: Interpolation,

    /// Subject directory; relative image paths are taken inside it
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// Overwrite an existing output
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl TrimLikeArgs {
    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.subj {
            Some(subj) if path.is_relative() && !subj.as_os_str().is_empty() => subj.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl LogLocation for TrimLikeArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        Some(&self.image)
    }
}

impl Task for TrimLikeArgs {
    const NAME: &'static str = "trim_like";
    const ABOUT: &'static str = "Trim or expand image in same space like reference";
    const USAGE: Option<&'static str> = Some("hypermapper trim_like -i [ img ] -r [ ref ] -o [ out ]");

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::TrimLike(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::TrimLike(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        let image = self.resolve(&self.image);
        let reference = self.resolve(&self.reference);
        let out = self.resolve(&self.out);
        require_input(&image)?;
        require_input(&reference)?;
        prepare_output(&out, self.force)?;

        // The converter reslices the last image on its stack into the space
        // of the one beneath it, so the reference goes first.
        let invocation = ToolInvocation::new(&ctx.tools().resampler)
            .arg(&reference)
            .arg(&image)
            .arg("-interpolation")
            .arg(self.interp.converter_name())
            .arg("-reslice-identity")
            .arg("-o")
            .arg(&out);

        ctx.run_tool(&invocation)?;
        ctx.log().info(format_args!(
            "Resliced {} like {} into {}",
            image.display(),
            reference.display(),
            out.display()
        ));
        Ok(())
    }
}
