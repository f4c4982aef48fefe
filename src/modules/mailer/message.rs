use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// A file carried by an outgoing email
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub file_name: String,
    pub content: Vec<u8>,
}

/// Provider-agnostic email message
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub attachments: Vec<EmailAttachment>,
}

/// What the provider returned for an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Failed to build email client: {0}")]
    Client(String),

    #[error("Email request failed: {0}")]
    Request(String),

    #[error("Email provider rejected the message: HTTP {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("Failed to parse email provider response: {0}")]
    InvalidResponse(String),

    #[error("Email request timed out after {0:?}")]
    Timeout(Duration),
}

/// Outbound transactional email transport
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<DeliveryReceipt, MailerError>;
}
