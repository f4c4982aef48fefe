use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::modules::mailer::MailerError;
use crate::shared::pages::PageError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Upload too large: maximum size is {0} bytes")]
    PayloadTooLarge(usize),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Delivery timed out after {0:?}")]
    DeliveryTimeout(Duration),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upload(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Filesystem(_) | AppError::Template(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Delivery(_) => StatusCode::BAD_GATEWAY,
            AppError::DeliveryTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<MailerError> for AppError {
    fn from(err: MailerError) -> Self {
        match err {
            MailerError::Timeout(timeout) => AppError::DeliveryTimeout(timeout),
            other => AppError::Delivery(other.to_string()),
        }
    }
}

impl From<PageError> for AppError {
    fn from(err: PageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }

        (status, self.to_string()).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
