//! Core library for the Hypermapper neuroimaging toolkit.
//!
//! The image work itself is done by external programs; this crate holds the
//! shared plumbing each subcommand runs inside: configuration, the scoped
//! search path, per-invocation run logs, subject directory conventions and
//! tool execution.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use hypermapper_core::config::ToolkitConfigBuilder;
//! use hypermapper_core::external::{ProcessRunner, ToolInvocation};
//! use hypermapper_core::log_router::RunLogger;
//! use hypermapper_core::{RunContext, SearchPaths};
//! use std::path::{Path, PathBuf};
//!
//! let config = ToolkitConfigBuilder::new().build();
//! let logger = RunLogger::attach("bias_corr", Path::new("bias_corr.log"), &config.logging).unwrap();
//! let mut paths = SearchPaths::new();
//! let scope = paths.enter([PathBuf::from("/opt/ants/bin")]);
//! let ctx = RunContext::new("bias_corr", &scope, &logger, &ProcessRunner, &config.tools);
//! ctx.run_tool(&ToolInvocation::new("N4BiasFieldCorrection").arg("--version")).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod log_router;
pub mod run_context;
pub mod subject;
pub mod utils;

// Re-exports for public API
pub use config::{ToolkitConfig, ToolkitConfigBuilder};
pub use error::{CoreError, CoreResult};
pub use external::{ProcessRunner, ToolInvocation, ToolOutput, ToolRunner};
pub use log_router::{LogLocation, RunLogger, resolve_log_path, resolve_log_path_in};
pub use run_context::{RunContext, SearchPathScope, SearchPaths};
pub use subject::SubjectLayout;
pub use utils::{format_duration, get_timestamp};
