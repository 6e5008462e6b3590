// this_file: src/api/analysis.rs
//! Image analysis endpoints: multipart upload and URL.

use axum::extract::{Multipart, Query, State};
use axum::Json;
use bytes::Bytes;
use log::info;
use serde::Deserialize;

use super::error::ApiError;
use super::AppState;
use crate::analysis::{AnalysisOptions, AnalysisResponse};
use crate::validate::{parse_edge_mode, parse_metrics, validate_upload};

/// Query parameters shared by both analysis endpoints.
#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    /// Comma-separated metrics: brightness, median, histogram
    pub metrics: Option<String>,
    /// Edge-based brightness mode: left_right, top_bottom, or all
    pub edge_mode: Option<String>,
}

/// Request body for URL-based analysis.
#[derive(Debug, Deserialize)]
pub struct UrlAnalysisRequest {
    pub url: String,
    pub metrics: Option<String>,
    pub edge_mode: Option<String>,
}

fn parse_options(
    metrics: Option<&str>,
    edge_mode: Option<&str>,
) -> Result<AnalysisOptions, ApiError> {
    Ok(AnalysisOptions {
        metrics: parse_metrics(metrics)?,
        edge_mode: parse_edge_mode(edge_mode)?,
    })
}

/// `POST /v1/image/analysis`: analyze an uploaded JPEG or PNG.
pub async fn analyze_upload(
    State(state): State<AppState>,
    Query(query): Query<AnalysisQuery>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    // Parameters are validated before the body is touched, and everything
    // is validated before any cache interaction.
    let options = parse_options(query.metrics.as_deref(), query.edge_mode.as_deref())?;

    let (content_type, bytes) = read_image_field(&mut multipart).await?;
    validate_upload(content_type.as_deref(), &bytes, state.settings.max_file_size)?;

    info!("Analyzing uploaded image ({} bytes)", bytes.len());
    let response = state.analyzer.analyze_upload(bytes, options).await?;
    Ok(Json(response))
}

/// `POST /v1/image/analysis/url`: analyze an image behind a URL.
pub async fn analyze_url(
    State(state): State<AppState>,
    Json(request): Json<UrlAnalysisRequest>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let options = parse_options(request.metrics.as_deref(), request.edge_mode.as_deref())?;
    let response = state.analyzer.analyze_url(&request.url, options).await?;
    Ok(Json(response))
}

/// Pull the `image` field out of the multipart body.
async fn read_image_field(
    multipart: &mut Multipart,
) -> Result<(Option<String>, Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {}", e)))?;
            return Ok((content_type, bytes));
        }
    }
    Err(ApiError::BadRequest(
        "missing multipart field 'image'".to_string(),
    ))
}
