use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::claims::models::Submission;
use crate::features::claims::services::naming;

/// Owns a submission directory until the pipeline completes.
///
/// Dropping the guard without calling [`SubmissionDir::persist`] removes the
/// directory and everything in it, which covers failed stages as well as
/// requests abandoned mid-flight.
#[derive(Debug)]
pub struct SubmissionDir {
    path: PathBuf,
    keep: bool,
}

impl SubmissionDir {
    fn new(path: PathBuf) -> Self {
        Self { path, keep: false }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Keep the directory on disk and hand back its path.
    pub fn persist(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for SubmissionDir {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => debug!("Removed abandoned submission directory {}", self.path.display()),
            Err(e) => warn!(
                "Failed to remove submission directory {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

/// Evidence file written into its submission directory
#[derive(Debug)]
pub struct SavedEvidence {
    pub directory: SubmissionDir,
    pub evidence_path: PathBuf,
}

/// Service that allocates submission directories and stores evidence files
pub struct UploadService {
    upload_root: PathBuf,
}

impl UploadService {
    pub fn new(upload_root: PathBuf) -> Self {
        Self { upload_root }
    }

    /// Create a fresh directory for the submission and write the evidence into it.
    ///
    /// The directory name is the normalized requester name plus a random
    /// suffix, created with a non-recursive `create_dir` so an existing path is
    /// never reused.
    pub async fn save_evidence(&self, submission: &Submission) -> Result<SavedEvidence> {
        let evidence = &submission.evidence;

        info!(
            "Uploaded file: name={}, size={}, content_type={}",
            evidence.file_name,
            evidence.data.len(),
            evidence.content_type
        );

        let dir_name = format!(
            "{}_{}",
            naming::folder_name(&submission.name),
            Uuid::new_v4().simple()
        );
        let dir_path = self.upload_root.join(dir_name);

        tokio::fs::create_dir(&dir_path).await.map_err(|e| {
            AppError::Filesystem(format!("Failed to create submission directory: {}", e))
        })?;
        let directory = SubmissionDir::new(dir_path);

        let file_name = naming::file_name(
            &submission.name,
            &submission.claim_date,
            &evidence.file_name,
        );
        let evidence_path = directory.path().join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&evidence_path)
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to create evidence file: {}", e)))?;

        file.write_all(&evidence.data)
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to write evidence file: {}", e)))?;
        file.flush()
            .await
            .map_err(|e| AppError::Filesystem(format!("Failed to write evidence file: {}", e)))?;

        debug!("Evidence stored at {}", evidence_path.display());

        Ok(SavedEvidence {
            directory,
            evidence_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::sample_submission;

    fn entries(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    #[tokio::test]
    async fn test_save_evidence_round_trips_bytes() {
        let root = tempfile::tempdir().unwrap();
        let service = UploadService::new(root.path().to_path_buf());

        let mut submission = sample_submission("Jane Doe");
        submission.evidence.data = (0..=255u8).cycle().take(70_000).collect();

        let saved = service.save_evidence(&submission).await.unwrap();

        let dirs = entries(root.path());
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0], saved.directory.path());

        let files = entries(saved.directory.path());
        assert_eq!(files, vec![saved.evidence_path.clone()]);
        assert_eq!(
            std::fs::read(&saved.evidence_path).unwrap(),
            submission.evidence.data
        );

        let file_name = saved.evidence_path.file_name().unwrap().to_str().unwrap();
        assert_eq!(file_name, "jane_doe_2023-04-15t00:00:00z_receipt.txt");

        let dir_name = saved.directory.path().file_name().unwrap().to_str().unwrap();
        assert!(dir_name.starts_with("jane_doe_"));
        assert!(!dir_name.contains(' '));

        saved.directory.persist();
    }

    #[tokio::test]
    async fn test_same_name_submissions_get_distinct_directories() {
        let root = tempfile::tempdir().unwrap();
        let service = UploadService::new(root.path().to_path_buf());

        let first = sample_submission("Jane Doe");
        let second = sample_submission("Jane Doe");

        let (a, b) = tokio::join!(service.save_evidence(&first), service.save_evidence(&second));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_ne!(a.directory.path(), b.directory.path());
        assert_eq!(entries(root.path()).len(), 2);
        assert!(a.evidence_path.exists());
        assert!(b.evidence_path.exists());
    }

    #[tokio::test]
    async fn test_dropped_guard_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let service = UploadService::new(root.path().to_path_buf());

        let saved = service
            .save_evidence(&sample_submission("Jane Doe"))
            .await
            .unwrap();
        let dir = saved.directory.path().to_path_buf();
        assert!(dir.exists());

        drop(saved);
        assert!(!dir.exists());
        assert!(entries(root.path()).is_empty());
    }

    #[tokio::test]
    async fn test_persisted_directory_is_kept() {
        let root = tempfile::tempdir().unwrap();
        let service = UploadService::new(root.path().to_path_buf());

        let saved = service
            .save_evidence(&sample_submission("Jane Doe"))
            .await
            .unwrap();
        let dir = saved.directory.persist();

        assert!(dir.exists());
        assert!(saved.evidence_path.exists());
    }

    #[tokio::test]
    async fn test_missing_upload_root_is_filesystem_error() {
        let root = tempfile::tempdir().unwrap();
        let service = UploadService::new(root.path().join("does-not-exist"));

        let err = service
            .save_evidence(&sample_submission("Jane Doe"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Filesystem(_)));
    }
}
