//! HTTP surface
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /` | upload form |
//! | `POST /scan` | multipart upload, results rendered into the form page |
//! | `POST /api/scan` | multipart upload, JSON report |
//! | `GET /health` | scanner availability |
//! | `/static/*` | stylesheet and other assets |

mod error;
mod handlers;
mod request_tracing;
pub mod templates;

pub use error::AppError;
pub use request_tracing::REQUEST_ID_HEADER;
pub use templates::{TemplateError, Templates};

use crate::config::ScanboxConfig;
use crate::scan::ScanService;
use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ScanboxConfig>,
    pub service: Arc<ScanService>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(config: ScanboxConfig, service: ScanService, templates: Templates) -> Self {
        Self {
            config: Arc::new(config),
            service: Arc::new(service),
            templates: Arc::new(templates),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_upload_size;

    Router::new()
        .route("/", get(handlers::home))
        .route("/scan", post(handlers::scan_page))
        .route("/api/scan", post(handlers::scan_api))
        .route("/health", get(handlers::health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(
            request_tracing::request_tracing_middleware,
        ))
        .with_state(state)
}

/// Runs the server until ctrl-c.
pub async fn serve(config: ScanboxConfig) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create {}", config.upload_dir.display()))?;

    let templates =
        Templates::load(config.template_dir.as_deref()).context("Failed to load templates")?;
    let service = ScanService::from_config(&config);
    let addr = config.bind_addr();

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(
        addr = %listener.local_addr()?,
        upload_dir = %config.upload_dir.display(),
        scanner = %config.scanner_bin,
        "Server listening"
    );

    let app = build_router(AppState::new(config, service, templates));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!(error = %e, "Cannot listen for ctrl-c; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
