//! Mailgun messages API client
//!
//! Sends multipart messages with attachments through
//! `POST {api_base}/{domain}/messages` using HTTP basic auth.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::message::{DeliveryReceipt, EmailSender, MailerError, OutgoingEmail};
use crate::core::config::MailgunConfig;

/// Response body of a successful send
#[derive(Debug, Deserialize)]
struct MailgunSendResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
}

pub struct MailgunClient {
    client: Client,
    messages_url: String,
    api_key: String,
    timeout: Duration,
}

impl MailgunClient {
    pub fn new(config: &MailgunConfig) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MailerError::Client(e.to_string()))?;

        Ok(Self {
            client,
            messages_url: format!("{}/{}/messages", config.api_base_url, config.domain),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    fn build_form(email: OutgoingEmail) -> Form {
        let mut form = Form::new()
            .text("from", email.from)
            .text("to", email.to)
            .text("subject", email.subject)
            .text("text", email.text);

        for attachment in email.attachments {
            let part = Part::bytes(attachment.content).file_name(attachment.file_name);
            form = form.part("attachment", part);
        }

        form
    }

    fn map_send_error(&self, err: reqwest::Error) -> MailerError {
        if err.is_timeout() {
            MailerError::Timeout(self.timeout)
        } else {
            MailerError::Request(err.to_string())
        }
    }
}

#[async_trait]
impl EmailSender for MailgunClient {
    async fn send(&self, email: OutgoingEmail) -> Result<DeliveryReceipt, MailerError> {
        debug!(
            "Sending message to {} with {} attachment(s) via {}",
            email.to,
            email.attachments.len(),
            self.messages_url
        );

        let response = self
            .client
            .post(&self.messages_url)
            .basic_auth("api", Some(&self.api_key))
            .multipart(Self::build_form(email))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MailerError::Rejected { status, body });
        }

        let parsed: MailgunSendResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                MailerError::Timeout(self.timeout)
            } else {
                MailerError::InvalidResponse(e.to_string())
            }
        })?;

        Ok(DeliveryReceipt {
            id: parsed.id,
            message: parsed.message,
        })
    }
}
