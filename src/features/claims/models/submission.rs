use std::fmt;

/// The file attached to a claim
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    /// Filename as sent by the browser
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// One form post, alive only for the duration of its request
#[derive(Debug, Clone)]
pub struct Submission {
    pub claim_date: String,
    pub email: String,
    pub subject: String,
    pub name: String,
    pub message: String,
    pub evidence: EvidenceUpload,
}

/// Pipeline position of a submission.
///
/// Stages only move forward, one step at a time; a failure is reported
/// together with the last stage that was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStage {
    Received,
    Uploaded,
    DocumentGenerated,
    Notified,
    Completed,
}

impl SubmissionStage {
    /// The stage that follows this one; `Completed` is terminal.
    pub fn next(self) -> Self {
        match self {
            SubmissionStage::Received => SubmissionStage::Uploaded,
            SubmissionStage::Uploaded => SubmissionStage::DocumentGenerated,
            SubmissionStage::DocumentGenerated => SubmissionStage::Notified,
            SubmissionStage::Notified | SubmissionStage::Completed => SubmissionStage::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStage::Received => "received",
            SubmissionStage::Uploaded => "uploaded",
            SubmissionStage::DocumentGenerated => "document_generated",
            SubmissionStage::Notified => "notified",
            SubmissionStage::Completed => "completed",
        }
    }
}

impl fmt::Display for SubmissionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
