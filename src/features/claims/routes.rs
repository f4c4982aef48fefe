use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::claims::handlers::{show_form, submit_claim, ClaimsState};

/// Multipart framing and text fields on top of the file itself
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the claims feature
pub fn routes(state: ClaimsState) -> Router {
    let body_limit = state.max_upload_size + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/",
            get(show_form)
                .post(submit_claim)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::claims::services::{
        DocumentService, NotificationService, SubmissionService, UploadService,
    };
    use crate::shared::pages::{PageRenderer, ALL_PAGES};
    use crate::shared::test_helpers::{
        notification_config, write_template_docx, RecordingSender, SenderBehavior,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    struct TestApp {
        server: TestServer,
        sender: Arc<RecordingSender>,
        workspace: tempfile::TempDir,
    }

    impl TestApp {
        fn uploads(&self) -> std::path::PathBuf {
            self.workspace.path().join("uploads")
        }

        fn submission_dirs(&self) -> usize {
            std::fs::read_dir(self.uploads()).unwrap().count()
        }
    }

    fn test_app(behavior: SenderBehavior, max_upload_size: usize) -> TestApp {
        let workspace = tempfile::tempdir().unwrap();
        let uploads = workspace.path().join("uploads");
        std::fs::create_dir(&uploads).unwrap();
        let template = workspace.path().join("Wellness Reimbursement Form.docx");
        write_template_docx(&template);

        let sender = Arc::new(RecordingSender::new(behavior));
        let submissions = SubmissionService::new(
            Arc::new(UploadService::new(uploads)),
            Arc::new(DocumentService::new(template)),
            Arc::new(NotificationService::new(
                sender.clone(),
                notification_config(),
                Duration::from_millis(200),
            )),
        );
        let pages = PageRenderer::from_dir(Path::new("templates/pages"), ALL_PAGES).unwrap();

        let state = ClaimsState {
            submissions: Arc::new(submissions),
            pages: Arc::new(pages),
            max_upload_size,
        };

        TestApp {
            server: TestServer::new(routes(state)).unwrap(),
            sender,
            workspace,
        }
    }

    fn claim_form() -> MultipartForm {
        MultipartForm::new()
            .add_text("claim_date", "2023-04-15T00:00:00Z")
            .add_text("email", "jane@example.com")
            .add_text("subject", "Gym membership")
            .add_text("name", "Jane Doe")
            .add_text("message", "April invoice attached")
    }

    fn evidence_part(content: &[u8]) -> Part {
        Part::bytes(content.to_vec())
            .file_name("Receipt April.pdf")
            .mime_type("application/pdf")
    }

    #[tokio::test]
    async fn test_get_renders_form() {
        let app = test_app(SenderBehavior::Accept, 1024 * 1024);

        let response = app.server.get("/").await;

        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("enctype=\"multipart/form-data\""));
        assert!(body.contains("name=\"claim_date\""));
        assert!(body.contains("name=\"file\""));
    }

    #[tokio::test]
    async fn test_post_submits_claim_end_to_end() {
        let app = test_app(SenderBehavior::Accept, 1024 * 1024);

        let response = app
            .server
            .post("/")
            .multipart(claim_form().add_part("file", evidence_part(b"%PDF-1.4 receipt")))
            .await;

        response.assert_status_ok();
        assert!(response.text().contains("Your reimbursement claim was submitted"));

        let sent = app.sender.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].attachments.len(), 2);
        assert_eq!(
            sent[0].attachments[0].file_name,
            "jane_doe_2023-04-15t00:00:00z_wellness_reimbursement_form.docx"
        );
        assert_eq!(
            sent[0].attachments[1].file_name,
            "jane_doe_2023-04-15t00:00:00z_receipt_april.pdf"
        );
        assert_eq!(sent[0].attachments[1].content, b"%PDF-1.4 receipt");
        assert_eq!(app.submission_dirs(), 1);
    }

    #[tokio::test]
    async fn test_post_without_file_is_upload_error() {
        let app = test_app(SenderBehavior::Accept, 1024 * 1024);

        let response = app.server.post("/").multipart(claim_form()).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("Upload error:"));
        assert_eq!(app.submission_dirs(), 0);
        assert!(app.sender.sent().is_empty());
    }

    #[tokio::test]
    async fn test_post_with_invalid_fields_is_validation_error() {
        let app = test_app(SenderBehavior::Accept, 1024 * 1024);

        let form = MultipartForm::new()
            .add_text("claim_date", "next tuesday")
            .add_text("email", "jane@example.com")
            .add_text("name", "Jane Doe")
            .add_part("file", evidence_part(b"receipt"));
        let response = app.server.post("/").multipart(form).await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.text().starts_with("Validation error:"));
        assert_eq!(app.submission_dirs(), 0);
    }

    #[tokio::test]
    async fn test_post_oversized_file_is_rejected() {
        let app = test_app(SenderBehavior::Accept, 16);

        let response = app
            .server
            .post("/")
            .multipart(claim_form().add_part("file", evidence_part(&[b'x'; 64])))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(app.submission_dirs(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_returns_bad_gateway_and_keeps_serving() {
        let app = test_app(SenderBehavior::Reject, 1024 * 1024);

        let response = app
            .server
            .post("/")
            .multipart(claim_form().add_part("file", evidence_part(b"receipt")))
            .await;

        response.assert_status(StatusCode::BAD_GATEWAY);
        let body = response.text();
        assert!(body.starts_with("Delivery error:"));
        assert!(!body.contains(&app.workspace.path().display().to_string()));
        assert_eq!(app.submission_dirs(), 0);

        // The process keeps serving after a failed delivery
        app.server.get("/").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_delivery_timeout_returns_gateway_timeout() {
        let app = test_app(SenderBehavior::Hang, 1024 * 1024);

        let response = app
            .server
            .post("/")
            .multipart(claim_form().add_part("file", evidence_part(b"receipt")))
            .await;

        response.assert_status(StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(app.submission_dirs(), 0);
    }
}
