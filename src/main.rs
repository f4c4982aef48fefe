mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::middleware;
use crate::features::claims::{
    routes as claims_routes, ClaimsState, DocumentService, NotificationService, SubmissionService,
    UploadService,
};
use crate::modules::mailer::MailgunClient;
use crate::shared::pages::{PageRenderer, ALL_PAGES};
use axum::Router;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pages = Arc::new(
        PageRenderer::from_dir(&config.app.pages_dir, ALL_PAGES)
            .map_err(|e| anyhow::anyhow!("Failed to load page templates: {}", e))?,
    );
    tracing::info!("Page templates loaded from {}", config.app.pages_dir.display());

    let mailgun_client = Arc::new(
        MailgunClient::new(&config.mailgun)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Mailgun client: {}", e))?,
    );
    tracing::info!(
        "Mailgun client initialized for domain {} (timeout {:?})",
        config.mailgun.domain,
        config.mailgun.timeout
    );

    let upload_service = Arc::new(UploadService::new(config.app.upload_root.clone()));
    let document_service = Arc::new(DocumentService::new(config.document.template_path.clone()));
    if !document_service.template_path().is_file() {
        tracing::warn!(
            "Document template not found at {}; submissions will fail until it exists",
            document_service.template_path().display()
        );
    }
    let notification_service = Arc::new(NotificationService::new(
        mailgun_client,
        config.notification.clone(),
        config.mailgun.timeout,
    ));
    let submission_service = Arc::new(SubmissionService::new(
        upload_service,
        document_service,
        notification_service,
    ));
    tracing::info!("Submission pipeline initialized");

    let claims_state = ClaimsState {
        submissions: submission_service,
        pages,
        max_upload_size: config.app.max_upload_size,
    };

    // Simple health check endpoint
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(claims_routes(claims_state))
        .merge(health_route)
        .layer(
            ServiceBuilder::new()
                // Generate X-Request-Id using UUID v7 (or use client-provided one)
                .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(middleware::MakeSpanWithRequestId)
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                // Propagate X-Request-Id to response headers
                .layer(PropagateRequestIdLayer::x_request_id()),
        );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));

    axum::serve(listener, app)
        .with_graceful_shutdown(middleware::shutdown_signal())
        .await?;

    Ok(())
}
