//! services/api/src/web/pdf.rs
//!
//! Same-origin PDF endpoints. The proxy streams Drive documents to the
//! in-browser viewer; `/api/pdf` buffers any URL and lets it be cached forever.

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::BytesMut;
use futures::TryStreamExt;
use serde::Deserialize;
use std::sync::Arc;
use study_catalog_core::drive::{check_proxy_target, ProxyTargetError};
use study_catalog_core::ports::PortError;
use tracing::{error, instrument};
use utoipa::IntoParams;

use crate::web::error::{ErrorBody, JsonError, JsonResult};
use crate::web::state::AppState;

const PDF_CONTENT_TYPE: &str = "application/pdf";
const PROXY_CACHE_CONTROL: &str = "public, max-age=0, s-maxage=0, must-revalidate";
const PDF_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Debug, Deserialize, IntoParams)]
pub struct ProxyQuery {
    /// Absolute URL of the document on an allowed Google host.
    pub file: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PdfQuery {
    /// Absolute URL of the document.
    pub url: Option<String>,
}

/// Streams a Google Drive document back as a PDF.
#[utoipa::path(
    get,
    path = "/api/pdf-proxy",
    params(ProxyQuery),
    responses(
        (status = 200, description = "The PDF bytes"),
        (status = 400, description = "Missing or invalid file parameter", body = ErrorBody),
        (status = 403, description = "Host is not allowed", body = ErrorBody),
        (status = 500, description = "Failed to fetch PDF", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn pdf_proxy_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> JsonResult<Response> {
    let file = query
        .file
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| JsonError::bad_request("Missing file parameter"))?;

    let target = check_proxy_target(&file).map_err(|e| match e {
        ProxyTargetError::InvalidUrl => JsonError::bad_request(e.to_string()),
        ProxyTargetError::HostNotAllowed => JsonError::new(StatusCode::FORBIDDEN, e.to_string()),
    })?;

    let document = state
        .fetcher
        .fetch(target.as_str())
        .await
        .map_err(|e| fetch_failure(e, target.as_str()))?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(header::CACHE_CONTROL, PROXY_CACHE_CONTROL);
    if let Some(length) = document.content_length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }
    builder
        .body(Body::from_stream(document.body))
        .map_err(|e| {
            error!("Failed to build proxy response: {}", e);
            JsonError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch PDF")
        })
}

/// Fetches any URL and returns it as an immutable, cacheable PDF.
#[utoipa::path(
    get,
    path = "/api/pdf",
    params(PdfQuery),
    responses(
        (status = 200, description = "The PDF bytes"),
        (status = 400, description = "Missing url parameter", body = ErrorBody),
        (status = 500, description = "Failed to fetch PDF", body = ErrorBody)
    )
)]
#[instrument(skip_all)]
pub async fn pdf_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PdfQuery>,
) -> JsonResult<impl IntoResponse> {
    let url = query
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| JsonError::bad_request("URL parameter is required"))?;

    let failed = |e: PortError| {
        error!(url = %url, "PDF fetch failed: {}", e);
        JsonError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch PDF")
    };

    let document = state.fetcher.fetch(&url).await.map_err(failed)?;
    let buffer = document
        .body
        .try_fold(BytesMut::new(), |mut acc, chunk| async move {
            acc.extend_from_slice(&chunk);
            Ok(acc)
        })
        .await
        .map_err(failed)?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(PDF_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static(PDF_CACHE_CONTROL)),
        ],
        buffer.freeze(),
    ))
}

/// Upstream error statuses are passed through; anything else is a 500.
fn fetch_failure(err: PortError, url: &str) -> JsonError {
    match err {
        PortError::Upstream { status } => JsonError::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            format!("Upstream error {status}"),
        ),
        other => {
            error!(url, "pdf-proxy error: {}", other);
            JsonError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch PDF")
        }
    }
}
