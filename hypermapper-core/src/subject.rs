//! Subject directory conventions.
//!
//! A subject directory is named after the subject and holds its images as
//! `<subj>_<modality>.nii.gz`, with segmentations under `pred/` and QC
//! output under `qc/`. Subcommands use these names as defaults whenever an
//! image flag is not given.

use crate::error::{CoreError, CoreResult};

use std::path::{Path, PathBuf};

/// Extension used for every image the toolkit writes.
pub const NIFTI_GZ: &str = ".nii.gz";

/// Paths inside a subject directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectLayout {
    dir: PathBuf,
    name: String,
}

impl SubjectLayout {
    /// Builds the layout for `dir`; the subject name is its last component.
    pub fn new(dir: &Path) -> CoreResult<Self> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                CoreError::OperationFailed(format!(
                    "Cannot derive a subject name from '{}'",
                    dir.display()
                ))
            })?
            .to_string();
        Ok(Self {
            dir: dir.to_path_buf(),
            name,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn image(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}_{suffix}{NIFTI_GZ}", self.name))
    }

    /// T1-weighted image before bias correction.
    pub fn t1w_raw(&self) -> PathBuf {
        self.image("T1")
    }

    /// Bias-corrected T1-weighted image.
    pub fn t1w(&self) -> PathBuf {
        self.image("T1_nu")
    }

    /// Bias-corrected FLAIR image.
    pub fn flair(&self) -> PathBuf {
        self.image("T2_FLAIR_nu")
    }

    /// Bias-corrected T2-weighted image.
    pub fn t2w(&self) -> PathBuf {
        self.image("T2_nu")
    }

    /// Directory holding predictions.
    pub fn pred_dir(&self) -> PathBuf {
        self.dir.join("pred")
    }

    /// WMH segmentation produced by `seg_wmh`.
    pub fn wmh_seg(&self) -> PathBuf {
        self.pred_dir()
            .join(format!("{}_wmh_seg{NIFTI_GZ}", self.name))
    }

    /// Directory holding QC mosaics.
    pub fn qc_dir(&self) -> PathBuf {
        self.dir.join("qc")
    }
}

/// File name of `path` without `.nii.gz`, `.nii`, `.img` or `.hdr`.
pub fn image_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    for ext in [NIFTI_GZ, ".nii", ".img", ".hdr"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    name
}

/// `<dir of input>/<stem><suffix>.nii.gz`.
pub fn sibling_image(input: &Path, suffix: &str) -> PathBuf {
    let file = format!("{}{suffix}{NIFTI_GZ}", image_stem(input));
    match input.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_uses_directory_name() -> CoreResult<()> {
        let layout = SubjectLayout::new(Path::new("/study/sub01"))?;
        assert_eq!(layout.name(), "sub01");
        assert_eq!(layout.t1w(), PathBuf::from("/study/sub01/sub01_T1_nu.nii.gz"));
        assert_eq!(layout.flair(), PathBuf::from("/study/sub01/sub01_T2_FLAIR_nu.nii.gz"));
        assert_eq!(
            layout.wmh_seg(),
            PathBuf::from("/study/sub01/pred/sub01_wmh_seg.nii.gz")
        );
        Ok(())
    }

    #[test]
    fn root_has_no_subject_name() {
        assert!(SubjectLayout::new(Path::new("/")).is_err());
    }

    #[test]
    fn stems_strip_known_extensions() {
        assert_eq!(image_stem(Path::new("/d/t1.nii.gz")), "t1");
        assert_eq!(image_stem(Path::new("scan.img")), "scan");
        assert_eq!(image_stem(Path::new("notes.txt")), "notes.txt");
    }

    #[test]
    fn sibling_keeps_directory() {
        assert_eq!(
            sibling_image(Path::new("/d/t1.nii"), "_n4"),
            PathBuf::from("/d/t1_n4.nii.gz")
        );
    }
}
