pub mod claim_handler;

pub use claim_handler::{show_form, submit_claim, ClaimsState};
