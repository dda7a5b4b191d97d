use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

// Helper function to get the compiled binary with a clean environment
fn hypermapper_cmd() -> Command {
    let mut cmd = Command::cargo_bin("hypermapper").expect("Failed to find hypermapper binary");
    cmd.env_remove("HYPERMAPPER_CONFIG")
        .env_remove("HYPERMAPPER_PATHS")
        .env_remove("HYPERMAPPER_LOG_LEVEL")
        .env_remove("HYPERMAPPER_LOG_APPEND")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_version_flags_print_name_and_version() {
    for flag in ["-v", "--version"] {
        hypermapper_cmd()
            .arg(flag)
            .assert()
            .success()
            .stdout(contains(format!("hypermapper {}", env!("CARGO_PKG_VERSION"))));
    }
}

#[test]
fn test_unknown_subcommand_fails() {
    hypermapper_cmd()
        .arg("segment_everything")
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_subcommand_help_lists_flags() {
    hypermapper_cmd()
        .args(["seg_wmh", "--help"])
        .assert()
        .success()
        .stdout(contains("--flair"))
        .stdout(contains("--thr"));
}

#[test]
fn test_trim_like_usage_is_custom() {
    hypermapper_cmd()
        .arg("trim_like")
        .assert()
        .failure()
        .stderr(contains("-i [ img ] -r [ ref ] -o [ out ]"));
}

#[test]
fn test_missing_input_fails_and_still_logs() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let image = dir.path().join("absent_T1.nii.gz");

    hypermapper_cmd()
        .current_dir(dir.path())
        .args(["bias_corr", "-i"])
        .arg(&image)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Input not found"));

    let log = fs::read_to_string(dir.path().join("logs").join("bias_corr.log"))?;
    assert!(log.contains("bias_corr failed after"));
    Ok(())
}

#[test]
fn test_empty_stdin_ends_interactive_session() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;

    hypermapper_cmd()
        .current_dir(dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(contains("Available commands"))
        .stdout(contains("trim_like"));

    assert!(fs::read_dir(dir.path())?.next().is_none());
    Ok(())
}

#[cfg(unix)]
fn write_fake_tool(dir: &Path, name: &str, body: &str) -> Result<(), Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n"))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_bias_corr_runs_tool_from_search_path() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let bin = dir.path().join("bin");
    fs::create_dir(&bin)?;
    // Writes its last argument, which is the output image.
    write_fake_tool(
        &bin,
        "N4BiasFieldCorrection",
        "for last; do :; done\necho corrected > \"$last\"",
    )?;

    let subj = dir.path().join("sub01");
    fs::create_dir(&subj)?;
    fs::write(subj.join("sub01_T1.nii.gz"), "raw")?;

    hypermapper_cmd()
        .current_dir(dir.path())
        .env("HYPERMAPPER_PATHS", &bin)
        .args(["bias_corr", "-s"])
        .arg(&subj)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(subj.join("sub01_T1_nu.nii.gz"))?.trim(), "corrected");
    let log = fs::read_to_string(subj.join("logs").join("bias_corr.log"))?;
    assert!(log.contains("N4BiasFieldCorrection -d 3"));
    assert!(log.contains("bias_corr finished in"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_config_file_renames_tool() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let bin = dir.path().join("bin");
    fs::create_dir(&bin)?;
    write_fake_tool(&bin, "volumes", "echo 'label,volume_ml'")?;

    let config = dir.path().join("hypermapper.toml");
    fs::write(
        &config,
        format!(
            "search_paths = [{:?}]\n\n[tools]\nstats = \"volumes\"\n",
            bin.display().to_string()
        ),
    )?;

    let seg = dir.path().join("lesions.nii.gz");
    fs::write(&seg, "")?;

    hypermapper_cmd()
        .current_dir(dir.path())
        .env("HYPERMAPPER_CONFIG", &config)
        .args(["stats_wmh", "--seg"])
        .arg(&seg)
        .assert()
        .success();

    let log = fs::read_to_string(dir.path().join("logs").join("stats_wmh.log"))?;
    assert!(log.contains("label,volume_ml"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_failing_tool_reports_status() -> Result<(), Box<dyn Error>> {
    let dir = tempdir()?;
    let bin = dir.path().join("bin");
    fs::create_dir(&bin)?;
    write_fake_tool(&bin, "c3d", "echo 'cannot read image' >&2\nexit 4")?;

    let hdr = dir.path().join("scan.hdr");
    fs::write(&hdr, "")?;

    hypermapper_cmd()
        .current_dir(dir.path())
        .env("HYPERMAPPER_PATHS", &bin)
        .args(["filetype", "-i"])
        .arg(&hdr)
        .assert()
        .failure()
        .stderr(contains("exited with status"))
        .stderr(contains("cannot read image"));
    Ok(())
}
