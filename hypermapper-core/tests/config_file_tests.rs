//! Tests for loading the toolkit configuration from TOML files
//!
//! These tests verify:
//! - Proper parsing of every section of the configuration file
//! - Correct default values for missing keys
//! - Rejection of unreadable, malformed and invalid configurations

use hypermapper_core::CoreError;
use hypermapper_core::config::{DEFAULT_N4, DEFAULT_SEGMENTER, ToolkitConfig};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_file_parsing() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config_path = dir.path().join("hypermapper.toml");

    let config_content = r#"
search_paths = ["/opt/hypermapper/bin", "/opt/ants/bin"]

[tools]
segmenter = "wmh-predict"
n4 = "/opt/ants/bin/N4BiasFieldCorrection"
converter = "c3d"
mosaic = "qc-mosaic"
stats = "wmh-volumes"
resampler = "c3d"

[logging]
level = "debug"
append = false
console = false
"#;
    fs::write(&config_path, config_content)?;

    let config = ToolkitConfig::from_file(&config_path)?;

    assert_eq!(
        config.search_paths,
        vec![
            PathBuf::from("/opt/hypermapper/bin"),
            PathBuf::from("/opt/ants/bin")
        ]
    );
    assert_eq!(config.tools.segmenter, "wmh-predict");
    assert_eq!(config.tools.n4, "/opt/ants/bin/N4BiasFieldCorrection");
    assert_eq!(config.tools.mosaic, "qc-mosaic");
    assert_eq!(config.tools.stats, "wmh-volumes");
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.append);
    assert!(!config.logging.console);
    config.validate()?;

    Ok(())
}

#[test]
fn test_missing_keys_keep_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let config_path = dir.path().join("partial.toml");
    fs::write(&config_path, "[tools]\nstats = \"volumes\"\n")?;

    let config = ToolkitConfig::from_file(&config_path)?;

    assert_eq!(config.tools.stats, "volumes");
    assert_eq!(config.tools.segmenter, DEFAULT_SEGMENTER);
    assert_eq!(config.tools.n4, DEFAULT_N4);
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.append);

    Ok(())
}

#[test]
fn test_unreadable_and_malformed_files() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let missing = dir.path().join("missing.toml");
    let err = ToolkitConfig::from_file(&missing).unwrap_err();
    assert!(matches!(err, CoreError::ConfigFile { ref path, .. } if path == &missing));

    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "[tools\nstats = ")?;
    assert!(matches!(
        ToolkitConfig::from_file(&broken),
        Err(CoreError::ConfigFile { .. })
    ));

    Ok(())
}

#[test]
fn test_invalid_values_fail_validation() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;

    let empty_tool = dir.path().join("empty_tool.toml");
    fs::write(&empty_tool, "[tools]\nconverter = \"  \"\n")?;
    let err = ToolkitConfig::from_file(&empty_tool)?.validate().unwrap_err();
    assert!(err.to_string().contains("tools.converter"));

    let bad_level = dir.path().join("bad_level.toml");
    fs::write(&bad_level, "[logging]\nlevel = \"loud\"\n")?;
    let err = ToolkitConfig::from_file(&bad_level)?.validate().unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));

    Ok(())
}
