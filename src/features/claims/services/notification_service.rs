use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::core::config::NotificationConfig;
use crate::core::error::{AppError, Result};
use crate::modules::mailer::{DeliveryReceipt, EmailAttachment, EmailSender, OutgoingEmail};

/// Service that emails the generated document and the evidence to the claims inbox
pub struct NotificationService {
    sender: Arc<dyn EmailSender>,
    config: NotificationConfig,
    timeout: Duration,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn EmailSender>, config: NotificationConfig, timeout: Duration) -> Self {
        Self {
            sender,
            config,
            timeout,
        }
    }

    /// Send both files as attachments, bounded by the delivery timeout.
    pub async fn dispatch(&self, document_path: &Path, evidence_path: &Path) -> Result<DeliveryReceipt> {
        let attachments = vec![
            read_attachment(document_path).await?,
            read_attachment(evidence_path).await?,
        ];

        let email = OutgoingEmail {
            from: self.config.sender.clone(),
            to: self.config.recipient.clone(),
            subject: self.config.subject.clone(),
            text: self.config.body.clone(),
            attachments,
        };

        let receipt = tokio::time::timeout(self.timeout, self.sender.send(email))
            .await
            .map_err(|_| AppError::DeliveryTimeout(self.timeout))??;

        info!("Claim delivered: id={} response={}", receipt.id, receipt.message);

        Ok(receipt)
    }
}

async fn read_attachment(path: &Path) -> Result<EmailAttachment> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| AppError::Internal("Attachment path has no file name".to_string()))?
        .to_string();

    let content = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::Filesystem(format!("Failed to read attachment '{}': {}", file_name, e)))?;

    Ok(EmailAttachment { file_name, content })
}
