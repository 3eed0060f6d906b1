use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::AppState;

/// Health data for the service and its collaborators.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub ocr: OcrStatus,
    pub text_api: TextApiStatus,
    pub cache: CacheStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct OcrStatus {
    pub languages: String,
    pub tessdata_dir: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TextApiStatus {
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct CacheStatus {
    pub extract_entries: usize,
    pub analyze_entries: usize,
    pub pincode_entries: usize,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthData> {
    Json(HealthData {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ocr: OcrStatus {
            languages: state.config.ocr.languages.clone(),
            tessdata_dir: state.config.ocr.tessdata_dir.clone(),
        },
        text_api: TextApiStatus {
            base_url: state.config.text_api.base_url.clone(),
            model: state.config.text_api.model.clone(),
        },
        cache: CacheStatus {
            extract_entries: state.extract_cache.len(),
            analyze_entries: state.analyze_cache.len(),
            pincode_entries: state.pincode.cache_len(),
        },
    })
}
