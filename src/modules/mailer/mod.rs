//! Mailer module for outbound transactional email
//!
//! Defines the provider-agnostic `EmailSender` seam and the Mailgun
//! implementation used in production.

mod mailgun_client;
mod message;

pub use mailgun_client::MailgunClient;
pub use message::{DeliveryReceipt, EmailAttachment, EmailSender, MailerError, OutgoingEmail};
