pub mod claim_dto;

pub use claim_dto::{ClaimFormDto, DEFAULT_EVIDENCE_NAME, FILE_FIELD};
