//! Report upload handler.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use tracing::info;

use super::super::error::ApiError;
use super::super::AppState;
use crate::models::AnalysisResponse;

/// Multipart field carrying the report.
const FILE_FIELD: &str = "file";

const DEFAULT_MEDIA_TYPE: &str = "application/octet-stream";

/// A report read fully into memory.
#[derive(Debug)]
struct Upload {
    file_name: Option<String>,
    media_type: String,
    bytes: Vec<u8>,
}

fn upload_error(error: MultipartError, limit: usize) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::TooLarge { limit }
    } else {
        ApiError::Upload(error.body_text())
    }
}

/// Read the `file` field of a multipart upload.
async fn read_upload(multipart: &mut Multipart, limit: usize) -> Result<Upload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let media_type = field
            .content_type()
            .map(str::to_string)
            .or_else(|| {
                file_name
                    .as_deref()
                    .and_then(|name| mime_guess::from_path(name).first_raw())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());

        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error(e, limit))?;

        return Ok(Upload {
            file_name,
            media_type,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::MissingFile)
}

/// Analyze an uploaded medical report.
pub async fn analyze_report(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::NotMultipart(e.body_text()))?;
    let upload = read_upload(&mut multipart, state.max_upload_bytes).await?;
    info!(
        "Received file: {}, type: {}, {} bytes",
        upload.file_name.as_deref().unwrap_or("<unnamed>"),
        upload.media_type,
        upload.bytes.len()
    );

    // Analysis runs on its own task; a panic there becomes a 500.
    let analyzer = state.analyzer.clone();
    let analysis = tokio::spawn(async move {
        analyzer
            .analyze(&upload.bytes, &upload.media_type)
            .await
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(analysis.into_response()))
}
