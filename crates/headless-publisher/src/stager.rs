//! Staging of artifacts before upload.
//!
//! Every artifact is written to one shared working directory. Once an
//! artifact has been uploaded it is removed and the directory is removed if
//! it is empty; artifacts that were not uploaded stay where they are.

use std::{
    fs,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use crate::report::PublishResult;

/// Staging errors.
#[derive(Debug, Error)]
pub enum StageError {
    /// Working directory could not be created.
    #[error("failed to create staging directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Artifact could not be written.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for staging operations.
pub type Result<T> = std::result::Result<T, StageError>;

/// Writes artifacts into the staging directory.
#[derive(Debug, Clone)]
pub struct FileStager {
    work_dir: PathBuf,
}

impl FileStager {
    /// Create a stager for a working directory.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// The staging directory.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Write `content` to `work_dir/file_name`, replacing any previous file.
    pub fn stage(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        if !self.work_dir.exists() {
            fs::create_dir_all(&self.work_dir).map_err(|source| StageError::CreateDir {
                path: self.work_dir.clone(),
                source,
            })?;
        }

        let path = self.work_dir.join(file_name);
        fs::write(&path, content).map_err(|source| StageError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), bytes = content.len(), "staged file");
        Ok(path)
    }

    /// Settle a staged file once its publish outcome is known.
    ///
    /// Only uploaded files are removed; a local fallback or a failed upload
    /// keeps the staged file as the published artifact.
    pub fn commit(&self, staged: &Path, result: &PublishResult) {
        match result {
            PublishResult::Uploaded => self.cleanup(staged),
            PublishResult::LocalFallback { .. } | PublishResult::UploadFailed { .. } => {
                debug!(path = %staged.display(), "keeping staged file");
            }
        }
    }

    /// Remove a staged file, then the staging directory if it is empty.
    ///
    /// Failures are ignored: other artifacts may still share the directory.
    pub fn cleanup(&self, staged: &Path) {
        if let Err(e) = fs::remove_file(staged) {
            debug!(path = %staged.display(), error = %e, "staged file not removed");
        }
        if let Err(e) = fs::remove_dir(&self.work_dir) {
            debug!(dir = %self.work_dir.display(), error = %e, "staging directory not removed");
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_stage_creates_directory() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("data"));

        let path = stager.stage("staging-pages.json", "[]").unwrap();

        assert_eq!(path, root.path().join("data/staging-pages.json"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_stage_overwrites() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("data"));

        stager.stage("a.json", "[1, 2, 3]").unwrap();
        let path = stager.stage("a.json", "[]").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn test_commit_uploaded_removes_file_and_dir() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("data"));
        let path = stager.stage("a.json", "[]").unwrap();

        stager.commit(&path, &PublishResult::Uploaded);

        assert!(!path.exists());
        assert!(!stager.work_dir().exists());
    }

    #[test]
    fn test_commit_uploaded_tolerates_shared_dir() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("data"));
        let kept = stager.stage("local.json", "[]").unwrap();
        let uploaded = stager.stage("remote.json", "[]").unwrap();

        stager.commit(&uploaded, &PublishResult::Uploaded);

        assert!(!uploaded.exists());
        assert!(kept.exists());
        assert!(stager.work_dir().exists());
    }

    #[test]
    fn test_commit_fallback_keeps_file() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("data"));
        let path = stager.stage("a.json", "[]").unwrap();

        stager.commit(
            &path,
            &PublishResult::LocalFallback {
                url: "/data/a.json".to_string(),
            },
        );
        stager.commit(
            &path,
            &PublishResult::UploadFailed {
                reason: "503".to_string(),
            },
        );

        assert!(path.exists());
    }

    #[test]
    fn test_cleanup_missing_file_is_silent() {
        let root = TempDir::new().unwrap();
        let stager = FileStager::new(root.path().join("missing"));

        stager.cleanup(&root.path().join("missing/a.json"));
    }
}
