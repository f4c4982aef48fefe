use validator::{Validate, ValidationError};

use crate::features::claims::models::claim_date::parse_claim_date;
use crate::features::claims::models::{EvidenceUpload, Submission};

/// Multipart field carrying the evidence file
pub const FILE_FIELD: &str = "file";

/// Filename used when the browser sends none
pub const DEFAULT_EVIDENCE_NAME: &str = "evidence";

/// Text fields of the claim form
#[derive(Debug, Clone, Default, Validate)]
pub struct ClaimFormDto {
    #[validate(custom(function = "validate_claim_date"))]
    pub claim_date: String,

    #[validate(email(message = "must be a valid email address"))]
    pub email: String,

    #[validate(length(max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 200, message = "is required"))]
    pub name: String,

    #[validate(length(max = 5000))]
    pub message: String,
}

fn validate_claim_date(claim_date: &str) -> Result<(), ValidationError> {
    if parse_claim_date(claim_date).is_some() {
        Ok(())
    } else {
        let mut err = ValidationError::new("claim_date");
        err.message = Some("must be a date such as 2023-04-15 or 2023-04-15T00:00:00Z".into());
        Err(err)
    }
}

impl ClaimFormDto {
    /// Assign a text field by its form name; unknown names are reported back.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "claim_date" => self.claim_date = value.trim().to_string(),
            "email" => self.email = value.trim().to_string(),
            "name" => self.name = value.trim().to_string(),
            "subject" => self.subject = value,
            "message" => self.message = value,
            _ => return false,
        }
        true
    }

    pub fn into_submission(self, evidence: EvidenceUpload) -> Submission {
        Submission {
            claim_date: self.claim_date,
            email: self.email,
            subject: self.subject,
            name: self.name,
            message: self.message,
            evidence,
        }
    }
}
