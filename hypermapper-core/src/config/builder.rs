// ============================================================================
// hypermapper-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for ToolkitConfig
//
// Provides a fluent API for creating ToolkitConfig instances, mostly used by
// tests and by embedders that do not read a configuration file.

// ---- Standard library imports ----
use std::path::PathBuf;

// ---- Internal crate imports ----
use super::{LogSettings, ToolCommands, ToolkitConfig};

/// Builder for creating ToolkitConfig instances.
///
/// Unlike [`ToolkitConfig::default`], the builder starts with no search
/// paths, so the result does not depend on where the test binary lives.
///
/// # Examples
///
/// ```rust
/// use hypermapper_core::config::ToolkitConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ToolkitConfigBuilder::new()
///     .search_path(PathBuf::from("/opt/ants/bin"))
///     .n4("N4BiasFieldCorrection")
///     .log_append(false)
///     .log_console(false)
///     .build();
/// assert_eq!(config.search_paths.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct ToolkitConfigBuilder {
    search_paths: Vec<PathBuf>,
    tools: ToolCommands,
    logging: LogSettings,
}

impl Default for ToolkitConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolkitConfigBuilder {
    /// Creates a builder with default tools and log settings.
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
            tools: ToolCommands::default(),
            logging: LogSettings::default(),
        }
    }

    /// Appends a directory to the search paths.
    pub fn search_path(mut self, path: PathBuf) -> Self {
        self.search_paths.push(path);
        self
    }

    /// Replaces all search paths.
    pub fn search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    /// Sets the segmentation executable.
    pub fn segmenter(mut self, tool: impl Into<String>) -> Self {
        self.tools.segmenter = tool.into();
        self
    }

    /// Sets the N4 bias correction executable.
    pub fn n4(mut self, tool: impl Into<String>) -> Self {
        self.tools.n4 = tool.into();
        self
    }

    /// Sets the format conversion executable.
    pub fn converter(mut self, tool: impl Into<String>) -> Self {
        self.tools.converter = tool.into();
        self
    }

    /// Sets the QC mosaic executable.
    pub fn mosaic(mut self, tool: impl Into<String>) -> Self {
        self.tools.mosaic = tool.into();
        self
    }

    /// Sets the volumetric summary executable.
    pub fn stats(mut self, tool: impl Into<String>) -> Self {
        self.tools.stats = tool.into();
        self
    }

    /// Sets the trim/resample executable.
    pub fn resampler(mut self, tool: impl Into<String>) -> Self {
        self.tools.resampler = tool.into();
        self
    }

    /// Sets the run log level ("error", "warn", "info", "debug", "trace").
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Chooses between appending to and truncating existing run logs.
    pub fn log_append(mut self, append: bool) -> Self {
        self.logging.append = append;
        self
    }

    /// Enables or disables echoing run log records to stderr.
    pub fn log_console(mut self, console: bool) -> Self {
        self.logging.console = console;
        self
    }

    /// Builds the ToolkitConfig.
    pub fn build(self) -> ToolkitConfig {
        ToolkitConfig {
            search_paths: self.search_paths,
            tools: self.tools,
            logging: self.logging,
        }
    }
}
