#[cfg(test)]
use crate::core::config::NotificationConfig;
#[cfg(test)]
use crate::features::claims::models::{EvidenceUpload, Submission};
#[cfg(test)]
use crate::modules::mailer::{DeliveryReceipt, EmailSender, MailerError, OutgoingEmail};
#[cfg(test)]
use async_trait::async_trait;
#[cfg(test)]
use std::io::{Read, Write};
#[cfg(test)]
use std::path::Path;
#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
pub fn sample_submission(name: &str) -> Submission {
    Submission {
        claim_date: "2023-04-15T00:00:00Z".to_string(),
        email: "jane@example.com".to_string(),
        subject: "Gym membership".to_string(),
        name: name.to_string(),
        message: "April invoice".to_string(),
        evidence: EvidenceUpload {
            file_name: "receipt.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"paid 40.00 for April".to_vec(),
        },
    }
}

#[cfg(test)]
pub fn notification_config() -> NotificationConfig {
    NotificationConfig {
        sender: "noreply@mg.example.com".to_string(),
        recipient: "claims@example.com".to_string(),
        subject: "Wellness reimbursement claim".to_string(),
        body: "Claim attached".to_string(),
    }
}

/// Write a minimal .docx package carrying both placeholders in the body and a header.
#[cfg(test)]
pub fn write_template_docx(path: &Path) {
    use zip::write::{FileOptions, ZipWriter};

    let parts: [(&str, &str); 4] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        ),
        (
            "word/document.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t xml:space="preserve">Employee: placeholder_name</w:t></w:r></w:p><w:p><w:r><w:t xml:space="preserve">Claim period: placeholder_claim_date</w:t></w:r></w:p></w:body></w:document>"#,
        ),
        (
            "word/header1.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><w:hdr xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:p><w:r><w:t>placeholder_name - placeholder_claim_date</w:t></w:r></w:p></w:hdr>"#,
        ),
        (
            "word/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
        ),
    ];

    let file = std::fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    zip.add_directory("word/", FileOptions::default()).unwrap();
    for (name, content) in parts {
        zip.start_file(name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

#[cfg(test)]
pub fn read_docx_part(path: &Path, part: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(part).unwrap();
    let mut content = String::new();
    entry.read_to_string(&mut content).unwrap();
    content
}

#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub enum SenderBehavior {
    Accept,
    Reject,
    Hang,
}

/// In-memory `EmailSender` that records every message it is handed
#[cfg(test)]
pub struct RecordingSender {
    behavior: SenderBehavior,
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[cfg(test)]
impl RecordingSender {
    pub fn new(behavior: SenderBehavior) -> Self {
        Self {
            behavior,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: OutgoingEmail) -> Result<DeliveryReceipt, MailerError> {
        let count = {
            let mut sent = self.sent.lock().unwrap();
            sent.push(email);
            sent.len()
        };

        match self.behavior {
            SenderBehavior::Accept => Ok(DeliveryReceipt {
                id: format!("<test-message-{}@mg.example.com>", count),
                message: "Queued. Thank you.".to_string(),
            }),
            SenderBehavior::Reject => Err(MailerError::Rejected {
                status: 500,
                body: "upstream unavailable".to_string(),
            }),
            SenderBehavior::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                Err(MailerError::Request("unreachable".to_string()))
            }
        }
    }
}
