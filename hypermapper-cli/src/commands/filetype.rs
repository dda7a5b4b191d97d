//! Implementation of the 'filetype' subcommand.
//!
//! Converts Analyze (.hdr/.img) images to compressed NIfTI. Given a single
//! input the output defaults to `<stem>.nii.gz` beside it; given only a
//! subject directory every Analyze header in it is converted.

use super::{Task, prepare_output, require_input, subject_layout};
use crate::cli::TaskArgs;

use clap::Args;
use hypermapper_core::subject::sibling_image;
use hypermapper_core::{LogLocation, RunContext, ToolInvocation};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FiletypeArgs {
    /// Subject directory; all Analyze images inside are converted
    #[arg(short = 's', long = "subj", value_name = "SUBJ_DIR")]
    pub subj: Option<PathBuf>,

    /// Analyze image to convert (.hdr or .img)
    #[arg(short = 'i', long = "input", value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output NIfTI (single input only)
    #[arg(short = 'o', long = "out", value_name = "OUT", requires = "input")]
    pub out: Option<PathBuf>,

    /// Overwrite existing outputs
    #[arg(short = 'f', long = "force")]
    pub force: bool,
}

impl LogLocation for FiletypeArgs {
    fn subject(&self) -> Option<&Path> {
        self.subj.as_deref()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
}

impl Task for FiletypeArgs {
    const NAME: &'static str = "filetype";
    const ABOUT: &'static str = "Convert the Analyze format to Nifti";

    fn into_task_args(self) -> TaskArgs {
        TaskArgs::Filetype(self)
    }

    fn from_task_args(args: &TaskArgs) -> Option<&Self> {
        match args {
            TaskArgs::Filetype(args) => Some(args),
            _ => None,
        }
    }

    fn run(&self, ctx: &RunContext<'_>) -> anyhow::Result<()> {
        let jobs = match (&self.input, subject_layout(self.subj.as_deref())?) {
            (Some(input), _) => {
                let out = self.out.clone().unwrap_or_else(|| sibling_image(input, ""));
                vec![(input.clone(), out)]
            }
            (None, Some(layout)) => analyze_headers(layout.dir())?
                .into_iter()
                .map(|hdr| {
                    let out = sibling_image(&hdr, "");
                    (hdr, out)
                })
                .collect(),
            (None, None) => anyhow::bail!("filetype needs --input or --subj"),
        };

        if jobs.is_empty() {
            ctx.log().warn(format_args!("No Analyze images found to convert"));
            return Ok(());
        }

        for (input, out) in &jobs {
            require_input(input)?;
            prepare_output(out, self.force)?;
            let invocation = ToolInvocation::new(&ctx.tools().converter)
                .arg(input)
                .arg("-o")
                .arg(out);
            ctx.run_tool(&invocation)?;
        }

        ctx.log()
            .info(format_args!("Converted {} image(s) to NIfTI", jobs.len()));
        Ok(())
    }
}

/// Analyze headers directly inside `dir`, sorted by name.
fn analyze_headers(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut headers = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_header = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("hdr"));
        if is_header && path.is_file() {
            headers.push(path);
        }
    }
    headers.sort();
    Ok(headers)
}
