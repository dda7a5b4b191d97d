//! Configuration structures and constants for the hypermapper-core library.
//!
//! The configuration decides three things: which extra directories the run
//! context puts in front of `PATH`, which executable backs each subcommand,
//! and how the per-invocation log file behaves.

mod builder;

use crate::error::{CoreError, CoreResult};

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use builder::ToolkitConfigBuilder;

// Default constants

/// Default executable for the WMH segmentation network.
pub const DEFAULT_SEGMENTER: &str = "hypermapper-seg";

/// Default N4 bias field correction executable (ANTs).
pub const DEFAULT_N4: &str = "N4BiasFieldCorrection";

/// Default image conversion and resampling executable (Convert3D).
pub const DEFAULT_CONVERTER: &str = "c3d";

/// Default QC mosaic renderer.
pub const DEFAULT_MOSAIC: &str = "hypermapper-mosaic";

/// Default volumetric summary executable.
pub const DEFAULT_STATS: &str = "hypermapper-stats";

/// Environment variable naming a TOML configuration file.
pub const ENV_CONFIG_FILE: &str = "HYPERMAPPER_CONFIG";

/// Environment variable holding extra search paths (OS path-list syntax).
pub const ENV_SEARCH_PATHS: &str = "HYPERMAPPER_PATHS";

/// Environment variable overriding the run log level.
pub const ENV_LOG_LEVEL: &str = "HYPERMAPPER_LOG_LEVEL";

/// Environment variable selecting append (`true`) or truncate (`false`).
pub const ENV_LOG_APPEND: &str = "HYPERMAPPER_LOG_APPEND";

/// Executables used by the subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolCommands {
    pub segmenter: String,
    pub n4: String,
    pub converter: String,
    pub mosaic: String,
    pub stats: String,
    pub resampler: String,
}

impl Default for ToolCommands {
    fn default() -> Self {
        Self {
            segmenter: DEFAULT_SEGMENTER.to_string(),
            n4: DEFAULT_N4.to_string(),
            converter: DEFAULT_CONVERTER.to_string(),
            mosaic: DEFAULT_MOSAIC.to_string(),
            stats: DEFAULT_STATS.to_string(),
            resampler: DEFAULT_CONVERTER.to_string(),
        }
    }
}

/// Settings for the per-invocation log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Minimum level written to the run log ("error" .. "trace").
    pub level: String,

    /// Append to an existing log file instead of truncating it.
    pub append: bool,

    /// Echo run log records to stderr as well.
    pub console: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            append: true,
            console: true,
        }
    }
}

impl LogSettings {
    /// Parses `level` into a filter.
    pub fn level_filter(&self) -> CoreResult<LevelFilter> {
        self.level
            .parse::<LevelFilter>()
            .map_err(|_| CoreError::Config(format!("unknown log level '{}'", self.level)))
    }
}

/// Main configuration structure for the toolkit.
///
/// Usually produced by [`ToolkitConfig::load`] in the binary and handed to
/// the dispatcher; tests build it with [`ToolkitConfigBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    /// Directories appended to the search path for every invocation.
    pub search_paths: Vec<PathBuf>,

    /// Executable names per external collaborator.
    pub tools: ToolCommands,

    /// Run log behaviour.
    pub logging: LogSettings,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            search_paths: bundled_search_paths(),
            tools: ToolCommands::default(),
            logging: LogSettings::default(),
        }
    }
}

impl ToolkitConfig {
    /// Reads a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CoreError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&text).map_err(|e| CoreError::ConfigFile {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Assembles the effective configuration: defaults, then the file given
    /// explicitly or through `HYPERMAPPER_CONFIG`, then environment overrides.
    pub fn load(explicit_file: Option<&Path>) -> CoreResult<Self> {
        let env_file = env::var_os(ENV_CONFIG_FILE).map(PathBuf::from);
        let mut config = match explicit_file.map(Path::to_path_buf).or(env_file) {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `HYPERMAPPER_PATHS`, `HYPERMAPPER_LOG_LEVEL` and
    /// `HYPERMAPPER_LOG_APPEND`.
    pub fn apply_env_overrides(&mut self) -> CoreResult<()> {
        if let Some(paths) = env::var_os(ENV_SEARCH_PATHS) {
            let extra: Vec<PathBuf> = env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            // Explicit locations are searched before the bundled ones.
            self.search_paths.splice(0..0, extra);
        }

        if let Ok(level) = env::var(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }

        if let Ok(append) = env::var(ENV_LOG_APPEND) {
            self.logging.append = parse_bool(&append).ok_or_else(|| {
                CoreError::Config(format!("{ENV_LOG_APPEND} must be true or false, got '{append}'"))
            })?;
        }

        Ok(())
    }

    /// Checks that every tool has a name and the log level parses.
    pub fn validate(&self) -> CoreResult<()> {
        let tools = [
            ("segmenter", &self.tools.segmenter),
            ("n4", &self.tools.n4),
            ("converter", &self.tools.converter),
            ("mosaic", &self.tools.mosaic),
            ("stats", &self.tools.stats),
            ("resampler", &self.tools.resampler),
        ];
        for (key, value) in tools {
            if value.trim().is_empty() {
                return Err(CoreError::Config(format!("tools.{key} must not be empty")));
            }
        }
        self.logging.level_filter()?;
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Locations shipped alongside the executable:
/// `<exe_dir>/../libexec/hypermapper` and `<exe_dir>/../share/hypermapper/bin`.
pub fn bundled_search_paths() -> Vec<PathBuf> {
    let Some(prefix) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().and_then(Path::parent).map(Path::to_path_buf))
    else {
        return Vec::new();
    };

    vec![
        prefix.join("libexec").join("hypermapper"),
        prefix.join("share").join("hypermapper").join("bin"),
    ]
}
