//! OCR endpoints.
//!
//! The `/extract` pair is a thin single-attempt wrapper: fast models,
//! single-block segmentation, strict character whitelist, `{text}` reply.
//! The `/analyze` pair runs the full pipeline: preprocessing tiers, the
//! parameter sweep over both buffers, remote refinement, and document
//! classification.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::v1::dto::{AnalyzeBase64Request, ExtractBase64Request, TextResponse};
use crate::api::v1::handlers::images::read_multipart_image;
use crate::api::AppState;
use crate::cache::fingerprint;
use crate::error::{KioskError, Result};
use crate::ocr::text::clean_text_basic;
use crate::ocr::{EngineMode, OcrOutcome};
use crate::services::uploads;

/// The plain extract endpoints always recognize English; the full analyze
/// endpoints take a language selector.
const SIMPLE_LANGUAGES: &str = "eng";

/// Character whitelist for the plain extract endpoints.
const SIMPLE_WHITELIST: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789._- ";

fn check_size(len: usize, limit: usize) -> Result<()> {
    if len > limit {
        return Err(KioskError::Validation(format!(
            "Image size exceeds {}MB limit",
            limit / (1024 * 1024)
        )));
    }
    Ok(())
}

/// Language selectors feed tessdata paths and download URLs, so only plain
/// '+'-separated lowercase codes are allowed through.
fn validate_languages(languages: &str) -> Result<()> {
    let valid = !languages.is_empty()
        && languages
            .chars()
            .all(|c| c.is_ascii_lowercase() || c == '+' || c == '_');
    if !valid {
        return Err(KioskError::Validation(format!(
            "Invalid languages selector: {languages}"
        )));
    }
    Ok(())
}

/// `POST /api/v1/extract/file`
#[utoipa::path(
    post,
    path = "/api/v1/extract/file",
    tag = "extract",
    operation_id = "extract.file",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in an `image` field"),
    responses(
        (status = 200, description = "Extracted text", body = TextResponse),
        (status = 400, description = "Missing file, oversized file, or no text detected"),
        (status = 500, description = "Recognition failed"),
    )
)]
pub async fn extract_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TextResponse>> {
    let upload = read_multipart_image(multipart).await?;
    check_size(upload.bytes.len(), state.config.ocr.simple_max_bytes)?;

    let key = fingerprint(&upload.bytes, "simple");
    if let Some(text) = state.extract_cache.get(&key) {
        return Ok(Json(TextResponse { text }));
    }

    // Guard lives until the end of the request; the spooled file is
    // removed on every exit path.
    let temp = uploads::spool(
        upload.bytes.clone(),
        state.config.storage.upload_dir.clone(),
    )
    .await?;

    if let Err(e) = state
        .pipeline
        .fetcher()
        .ensure(EngineMode::Fast, SIMPLE_LANGUAGES)
        .await
    {
        tracing::warn!(error = %e, "Traineddata fetch failed");
    }

    let raw = state
        .pipeline
        .engine()
        .recognize_single(temp.path().to_path_buf(), SIMPLE_LANGUAGES, SIMPLE_WHITELIST)
        .await?;

    let text = clean_text_basic(&raw);
    if text.is_empty() {
        return Err(KioskError::NoTextDetected);
    }

    state.extract_cache.put(key, text.clone());
    Ok(Json(TextResponse { text }))
}

/// `POST /api/v1/extract/base64`
#[utoipa::path(
    post,
    path = "/api/v1/extract/base64",
    tag = "extract",
    operation_id = "extract.base64",
    request_body = ExtractBase64Request,
    responses(
        (status = 200, description = "Extracted text", body = TextResponse),
        (status = 400, description = "Missing payload, invalid base64, or no text detected"),
        (status = 500, description = "Recognition failed"),
    )
)]
pub async fn extract_base64(
    State(state): State<AppState>,
    Json(request): Json<ExtractBase64Request>,
) -> Result<Json<TextResponse>> {
    let base64 = request
        .base64
        .ok_or_else(|| KioskError::Validation("Missing \"base64\" in request body".into()))?;

    let bytes = crate::services::images::decode_image_payload(&base64)?;
    check_size(bytes.len(), state.config.ocr.simple_max_bytes)?;

    let key = fingerprint(&bytes, "simple");
    if let Some(text) = state.extract_cache.get(&key) {
        return Ok(Json(TextResponse { text }));
    }

    if let Err(e) = state
        .pipeline
        .fetcher()
        .ensure(EngineMode::Fast, SIMPLE_LANGUAGES)
        .await
    {
        tracing::warn!(error = %e, "Traineddata fetch failed");
    }

    let raw = state
        .pipeline
        .engine()
        .recognize_single_mem(bytes, SIMPLE_LANGUAGES, SIMPLE_WHITELIST)
        .await?;

    let text = clean_text_basic(&raw);
    if text.is_empty() {
        return Err(KioskError::NoTextDetected);
    }

    state.extract_cache.put(key, text.clone());
    Ok(Json(TextResponse { text }))
}

/// `POST /api/v1/analyze/file`
#[utoipa::path(
    post,
    path = "/api/v1/analyze/file",
    tag = "analyze",
    operation_id = "analyze.file",
    request_body(content_type = "multipart/form-data", content = String, description = "Image upload in an `image` field, with an optional `languages` field"),
    responses(
        (status = 200, description = "Extracted, refined, and classified text", body = OcrOutcome),
        (status = 400, description = "Missing or invalid upload"),
        (status = 500, description = "All recognition strategies exhausted"),
    )
)]
pub async fn analyze_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<OcrOutcome>> {
    let upload = read_multipart_image(multipart).await?;
    check_size(upload.bytes.len(), state.config.ocr.full_max_bytes)?;

    let languages = upload
        .fields
        .iter()
        .find(|(name, _)| name == "languages")
        .map(|(_, value)| value.clone())
        .unwrap_or_else(|| state.config.ocr.languages.clone());
    validate_languages(&languages)?;

    let key = fingerprint(&upload.bytes, &languages);
    if let Some(outcome) = state.analyze_cache.get(&key) {
        return Ok(Json(outcome));
    }

    let temp = uploads::spool(
        upload.bytes.clone(),
        state.config.storage.upload_dir.clone(),
    )
    .await?;
    tracing::debug!(path = %temp.path().display(), "Upload spooled");

    let outcome = state.pipeline.analyze(upload.bytes, &languages).await?;

    state.analyze_cache.put(key, outcome.clone());
    Ok(Json(outcome))
}

/// `POST /api/v1/analyze/base64`
#[utoipa::path(
    post,
    path = "/api/v1/analyze/base64",
    tag = "analyze",
    operation_id = "analyze.base64",
    request_body = AnalyzeBase64Request,
    responses(
        (status = 200, description = "Extracted, refined, and classified text", body = OcrOutcome),
        (status = 400, description = "Missing or invalid base64 payload"),
        (status = 500, description = "All recognition strategies exhausted"),
    )
)]
pub async fn analyze_base64(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeBase64Request>,
) -> Result<Json<OcrOutcome>> {
    let base64 = request
        .base64
        .ok_or_else(|| KioskError::Validation("Missing \"base64\" in request body".into()))?;

    if !base64.starts_with("data:image/") {
        return Err(KioskError::Validation(
            "Invalid base64 image format. Must start with \"data:image/...\"".into(),
        ));
    }

    let bytes = crate::services::images::decode_image_payload(&base64)?;
    check_size(bytes.len(), state.config.ocr.full_max_bytes)?;

    let languages = request
        .languages
        .unwrap_or_else(|| state.config.ocr.languages.clone());
    validate_languages(&languages)?;

    let key = fingerprint(&bytes, &languages);
    if let Some(outcome) = state.analyze_cache.get(&key) {
        return Ok(Json(outcome));
    }

    let outcome = state.pipeline.analyze(bytes, &languages).await?;

    state.analyze_cache.put(key, outcome.clone());
    Ok(Json(outcome))
}
