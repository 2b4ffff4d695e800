use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{Document, Metadata};
use crate::state::AppState;

const X_REQUEST_ID: &str = "x-request-id";
const X_PAGE_COUNT: &str = "x-page-count";

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub title: String,
    pub university: Option<String>,
    pub college: Option<String>,
    pub department: Option<String>,
}

impl ReportRequest {
    /// Fills missing institution names from config and rejects blank titles.
    fn into_metadata(self, state: &AppState) -> Result<Metadata, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("title must not be empty".to_string()));
        }
        let mut metadata = state.config.institution.metadata(&self.title);
        if let Some(university) = self.university {
            metadata.university = university;
        }
        if let Some(college) = self.college {
            metadata.college = college;
        }
        if let Some(department) = self.department {
            metadata.department = department;
        }
        Ok(metadata)
    }
}

/// POST /api/v1/reports
/// Generates the report and returns the PDF as an attachment.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Response, AppError> {
    let metadata = req.into_metadata(&state)?;
    let request_id = Uuid::new_v4();
    info!(%request_id, title = %metadata.title, "report requested over HTTP");

    let generator = state.generator.clone();
    let report = tokio::task::spawn_blocking(move || generator.generate(request_id, metadata))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking failed in report generation: {e}"))??;

    let pdf = report
        .take_bytes()
        .await
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", report.path.display()))?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/pdf"));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&report.file_name)?,
    );
    headers.insert(
        HeaderName::from_static(X_REQUEST_ID),
        header_value(&report.request_id.to_string())?,
    );
    headers.insert(
        HeaderName::from_static(X_PAGE_COUNT),
        header_value(&report.page_count.to_string())?,
    );

    Ok((StatusCode::OK, headers, Bytes::from(pdf)).into_response())
}

/// POST /api/v1/reports/layout
/// Returns the laid-out document without rendering it.
pub async fn handle_layout(
    State(state): State<AppState>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<Document>, AppError> {
    let metadata = req.into_metadata(&state)?;
    let generator = state.generator.clone();
    let document = tokio::task::spawn_blocking(move || generator.layout(metadata))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking failed in layout: {e}"))??;
    Ok(Json(document))
}

fn header_value(value: &str) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("invalid header value {value:?}: {e}")))
}

/// `attachment` with an ASCII fallback name and the RFC 5987 UTF-8 name.
fn content_disposition(file_name: &str) -> Result<HeaderValue, AppError> {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    header_value(&format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        percent_encode(file_name)
    ))
}

fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'-' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
