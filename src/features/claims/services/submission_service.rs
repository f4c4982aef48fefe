use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::core::error::AppError;
use crate::features::claims::models::{Submission, SubmissionStage};
use crate::features::claims::services::{DocumentService, NotificationService, UploadService};
use crate::modules::mailer::DeliveryReceipt;

/// Artifacts and delivery result of a completed submission
#[derive(Debug)]
pub struct SubmissionReceipt {
    pub directory: PathBuf,
    pub evidence_path: PathBuf,
    pub document_path: PathBuf,
    pub delivery: DeliveryReceipt,
}

/// A submission that stopped short of `Completed`
#[derive(Debug)]
pub struct SubmissionFailure {
    /// Last stage reached before the error
    pub stage: SubmissionStage,
    pub error: AppError,
}

/// Runs upload, document generation and notification strictly in order
pub struct SubmissionService {
    uploads: Arc<UploadService>,
    documents: Arc<DocumentService>,
    notifications: Arc<NotificationService>,
}

impl SubmissionService {
    pub fn new(
        uploads: Arc<UploadService>,
        documents: Arc<DocumentService>,
        notifications: Arc<NotificationService>,
    ) -> Self {
        Self {
            uploads,
            documents,
            notifications,
        }
    }

    /// Process one submission.
    ///
    /// The first failing stage short-circuits the rest. The submission directory
    /// is removed unless the pipeline reaches `Completed`.
    pub async fn process(
        &self,
        submission: Submission,
    ) -> Result<SubmissionReceipt, SubmissionFailure> {
        let mut stage = SubmissionStage::Received;
        info!(
            "Processing claim from {} <{}>: subject={:?}, claim_date={}",
            submission.name, submission.email, submission.subject, submission.claim_date
        );
        debug!("Claim message is {} characters", submission.message.chars().count());

        let saved = self
            .uploads
            .save_evidence(&submission)
            .await
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage);

        let document_path = self
            .documents
            .generate(saved.directory.path(), &submission)
            .await
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage);

        let delivery = self
            .notifications
            .dispatch(&document_path, &saved.evidence_path)
            .await
            .map_err(|e| fail(stage, e))?;
        stage = advance(stage);

        let directory = saved.directory.persist();
        advance(stage);

        info!(
            "Submission completed for '{}' in {}",
            submission.name,
            directory.display()
        );

        Ok(SubmissionReceipt {
            directory,
            evidence_path: saved.evidence_path,
            document_path,
            delivery,
        })
    }
}

fn advance(stage: SubmissionStage) -> SubmissionStage {
    let next = stage.next();
    debug!("Submission stage {} -> {}", stage, next);
    next
}

fn fail(stage: SubmissionStage, error: AppError) -> SubmissionFailure {
    if error.status_code().is_server_error() {
        error!("Submission failed after stage {}: {}", stage, error);
    } else {
        warn!("Submission failed after stage {}: {}", stage, error);
    }
    SubmissionFailure { stage, error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        notification_config, sample_submission, write_template_docx, RecordingSender,
        SenderBehavior,
    };
    use std::path::Path;
    use std::time::Duration;

    struct Fixture {
        root: tempfile::TempDir,
        sender: Arc<RecordingSender>,
        service: SubmissionService,
    }

    fn fixture(behavior: SenderBehavior, template_path: Option<&Path>) -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let uploads_dir = root.path().join("uploads");
        std::fs::create_dir(&uploads_dir).unwrap();

        let template = match template_path {
            Some(path) => path.to_path_buf(),
            None => {
                let path = root.path().join("Wellness Reimbursement Form.docx");
                write_template_docx(&path);
                path
            }
        };

        let sender = Arc::new(RecordingSender::new(behavior));
        let service = SubmissionService::new(
            Arc::new(UploadService::new(uploads_dir)),
            Arc::new(DocumentService::new(template)),
            Arc::new(NotificationService::new(
                sender.clone(),
                notification_config(),
                Duration::from_millis(200),
            )),
        );

        Fixture {
            root,
            sender,
            service,
        }
    }

    fn submission_dirs(root: &Path) -> usize {
        std::fs::read_dir(root.join("uploads")).unwrap().count()
    }

    #[tokio::test]
    async fn test_process_completes_and_keeps_artifacts() {
        let fx = fixture(SenderBehavior::Accept, None);

        let receipt = fx
            .service
            .process(sample_submission("Jane Doe"))
            .await
            .unwrap();

        assert!(receipt.directory.is_dir());
        assert_eq!(std::fs::read_dir(&receipt.directory).unwrap().count(), 2);
        assert!(receipt.document_path.starts_with(&receipt.directory));
        assert!(receipt.evidence_path.starts_with(&receipt.directory));
        assert_eq!(receipt.delivery.id, "<test-message-1@mg.example.com>");

        let sent = fx.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachments.len(), 2);
        assert_eq!(submission_dirs(fx.root.path()), 1);
    }

    #[tokio::test]
    async fn test_template_failure_stops_before_notification() {
        let missing = std::env::temp_dir().join("definitely-missing-template.docx");
        let fx = fixture(SenderBehavior::Accept, Some(&missing));

        let failure = fx
            .service
            .process(sample_submission("Jane Doe"))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, SubmissionStage::Uploaded);
        assert!(matches!(failure.error, AppError::Template(_)));
        assert!(fx.sender.sent().is_empty());
        assert_eq!(submission_dirs(fx.root.path()), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_and_cleaned_up() {
        let fx = fixture(SenderBehavior::Reject, None);

        let failure = fx
            .service
            .process(sample_submission("Jane Doe"))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, SubmissionStage::DocumentGenerated);
        assert!(matches!(failure.error, AppError::Delivery(_)));
        assert_eq!(submission_dirs(fx.root.path()), 0);
    }

    #[tokio::test]
    async fn test_delivery_timeout_is_reported() {
        let fx = fixture(SenderBehavior::Hang, None);

        let failure = fx
            .service
            .process(sample_submission("Jane Doe"))
            .await
            .unwrap_err();

        assert_eq!(failure.stage, SubmissionStage::DocumentGenerated);
        assert!(matches!(failure.error, AppError::DeliveryTimeout(_)));
    }

    #[tokio::test]
    async fn test_evidence_named_like_template_keeps_both_files() {
        let fx = fixture(SenderBehavior::Accept, None);
        let mut submission = sample_submission("Jane Doe");
        submission.evidence.file_name = "WELLNESS Reimbursement Form.docx".to_string();
        submission.evidence.data = b"MY REAL RECEIPT".to_vec();

        let receipt = fx.service.process(submission).await.unwrap();

        assert_ne!(receipt.document_path, receipt.evidence_path);
        assert_eq!(std::fs::read_dir(&receipt.directory).unwrap().count(), 2);
        assert_eq!(
            std::fs::read(&receipt.evidence_path).unwrap(),
            b"MY REAL RECEIPT"
        );

        let sent = fx.sender.sent();
        let attachments = &sent[0].attachments;
        assert_eq!(attachments.len(), 2);
        assert_ne!(attachments[0].file_name, attachments[1].file_name);
        assert!(attachments
            .iter()
            .any(|a| a.content.as_slice() == b"MY REAL RECEIPT"));
    }

    #[tokio::test]
    async fn test_long_name_and_file_name_complete() {
        let fx = fixture(SenderBehavior::Accept, None);
        let mut submission = sample_submission(&"Jane".repeat(40));
        submission.evidence.file_name = format!("{}.pdf", "scan".repeat(25));

        let receipt = fx.service.process(submission).await.unwrap();

        assert_eq!(std::fs::read_dir(&receipt.directory).unwrap().count(), 2);
        assert!(receipt.evidence_path.to_string_lossy().ends_with(".pdf"));
    }

    #[tokio::test]
    async fn test_multibyte_name_completes() {
        let fx = fixture(SenderBehavior::Accept, None);

        let receipt = fx
            .service
            .process(sample_submission(&"\u{00e9}".repeat(200)))
            .await
            .unwrap();

        assert!(receipt.directory.is_dir());
        assert_eq!(std::fs::read_dir(&receipt.directory).unwrap().count(), 2);
    }
}
