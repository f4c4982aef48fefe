pub mod document_service;
pub mod naming;
pub mod notification_service;
pub mod submission_service;
pub mod upload_service;

pub use document_service::DocumentService;
pub use notification_service::NotificationService;
pub use submission_service::SubmissionService;
pub use upload_service::UploadService;
