// hypermapper-cli/src/cli.rs
//
// Parsed-argument record: one variant per subcommand, each carrying exactly
// the fields that subcommand accepts.

use crate::commands::{
    BiasCorrArgs, FiletypeArgs, SegQcArgs, SegWmhArgs, StatsWmhArgs, TrimLikeArgs,
};
use hypermapper_core::LogLocation;
use std::path::Path;

/// Program name shown in usage and `--version` output.
pub const PROGRAM: &str = "hypermapper";

/// Version printed by `-v/--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq)]
pub enum TaskArgs {
    SegWmh(SegWmhArgs),
    SegQc(SegQcArgs),
    BiasCorr(BiasCorrArgs),
    Filetype(FiletypeArgs),
    StatsWmh(StatsWmhArgs),
    TrimLike(TrimLikeArgs),
}

impl TaskArgs {
    fn location(&self) -> &dyn LogLocation {
        match self {
            Self::SegWmh(args) => args,
            Self::SegQc(args) => args,
            Self::BiasCorr(args) => args,
            Self::Filetype(args) => args,
            Self::StatsWmh(args) => args,
            Self::TrimLike(args) => args,
        }
    }
}

impl LogLocation for TaskArgs {
    fn subject(&self) -> Option<&Path> {
        self.location().subject()
    }

    fn primary_input(&self) -> Option<&Path> {
        self.location().primary_input()
    }
}
