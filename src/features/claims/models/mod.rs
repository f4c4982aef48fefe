pub mod claim_date;
pub mod submission;

pub use submission::{EvidenceUpload, Submission, SubmissionStage};
