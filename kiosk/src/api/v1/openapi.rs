use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use crate::ocr;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kiosk API",
        version = "1.0.0",
        description = "A collection of small HTTP utility endpoints: OCR text extraction, QR codes, image conversion, pincode lookup, web scraping, and color palettes.",
    ),
    paths(
        handlers::health::health_check,
        handlers::pincode::get_pincode,
        handlers::qr::generate,
        handlers::scrape::scrape,
        handlers::palette::generate,
        handlers::images::to_base64,
        handlers::images::from_base64,
        handlers::images::convert,
        handlers::extract::extract_file,
        handlers::extract::extract_base64,
        handlers::extract::analyze_file,
        handlers::extract::analyze_base64,
    ),
    components(schemas(
        // Pincode
        dto::PincodeResponse,
        services::pincode::Location,
        // QR
        dto::QrResponse,
        // Scrape
        services::scrape::PageSummary,
        services::scrape::PageLink,
        // Colors
        dto::PaletteResponse,
        services::palette::SeedPalette,
        services::palette::PaletteKind,
        // Images
        dto::DataUrlResponse,
        dto::FromBase64Request,
        dto::SavedImageResponse,
        // Extract / analyze
        dto::ExtractBase64Request,
        dto::AnalyzeBase64Request,
        dto::TextResponse,
        ocr::OcrOutcome,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::OcrStatus,
        handlers::health::TextApiStatus,
        handlers::health::CacheStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "extract", description = "Plain OCR text extraction"),
        (name = "analyze", description = "Full OCR pipeline with refinement and classification"),
        (name = "pincode", description = "Pincode to city/state lookup"),
        (name = "qr", description = "QR code generation"),
        (name = "scrape", description = "Web page scraping"),
        (name = "colors", description = "Color palette generation"),
        (name = "images", description = "Base64 and format conversion"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
