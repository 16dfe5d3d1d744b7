use super::error::AppError;
use super::AppState;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::{debug, warn};

const UPLOAD_FIELD: &str = "file";

async fn read_upload(mut multipart: Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            debug!(file_name = ?field.file_name(), "Receiving upload");
            return Ok(field.bytes().await?);
        }
    }
    Err(AppError::MissingFile)
}

fn render_page(state: &AppState, status: StatusCode, results: Option<&Value>) -> Response {
    match state.templates.render_index(results) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => AppError::Template(e).into_response(),
    }
}

pub(crate) async fn home(State(state): State<AppState>) -> Response {
    render_page(&state, StatusCode::OK, None)
}

/// Form endpoint: every outcome, including failures, is rendered into the page.
pub(crate) async fn scan_page(State(state): State<AppState>, multipart: Multipart) -> Response {
    let result = match read_upload(multipart).await {
        Ok(data) => state.service.scan_upload(data).await.map_err(AppError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => {
            let results = outcome.report.into_value();
            render_page(&state, StatusCode::OK, Some(&results))
        }
        Err(e) => {
            let status = e.status();
            warn!(status = status.as_u16(), error = %e, "Scan request failed");
            render_page(&state, status, Some(&json!({ "error": e.to_string() })))
        }
    }
}

pub(crate) async fn scan_api(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<Value>, AppError> {
    let data = read_upload(multipart).await?;
    let outcome = state.service.scan_upload(data).await?;

    Ok(Json(json!({
        "scan_id": outcome.scan_id.to_string(),
        "started_at": outcome.started_at.to_rfc3339(),
        "duration_ms": outcome.duration.as_millis() as u64,
        "report": outcome.report,
    })))
}

pub(crate) async fn health(State(state): State<AppState>) -> Response {
    let scanner = state.service.scanner();

    match scanner.version().await {
        Ok(version) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "scanner": scanner.name(),
                "version": version,
            })),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unavailable",
                "scanner": scanner.name(),
                "error": e.to_string(),
            })),
        )
            .into_response(),
    }
}
