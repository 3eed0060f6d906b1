use axum::extract::{Query, State};
use axum::Json;

use crate::api::v1::dto::{QrQuery, QrResponse};
use crate::api::AppState;
use crate::error::{KioskError, Result};
use crate::services::qr;

/// `GET /api/v1/qr`
#[utoipa::path(
    get,
    path = "/api/v1/qr",
    tag = "qr",
    operation_id = "qr.generate",
    params(QrQuery),
    responses(
        (status = 200, description = "QR code as a base64 PNG data URL", body = QrResponse),
        (status = 400, description = "Missing or oversized data parameter"),
    )
)]
pub async fn generate(
    State(_state): State<AppState>,
    Query(query): Query<QrQuery>,
) -> Result<Json<QrResponse>> {
    let data = query
        .data
        .ok_or_else(|| KioskError::Validation("Missing \"data\" query parameter".into()))?;

    let base64 = qr::generate_data_url(&data)?;
    Ok(Json(QrResponse { base64 }))
}
