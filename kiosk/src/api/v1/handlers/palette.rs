use axum::extract::{Query, State};
use axum::Json;

use crate::api::v1::dto::{PaletteQuery, PaletteResponse};
use crate::api::AppState;
use crate::error::Result;
use crate::services::palette::{self, PaletteKind};

const DEFAULT_SEED: &str = "#3498db";

/// `GET /api/v1/colors/palette`
#[utoipa::path(
    get,
    path = "/api/v1/colors/palette",
    tag = "colors",
    operation_id = "colors.palette",
    params(PaletteQuery),
    responses(
        (status = 200, description = "Palettes derived from each seed", body = PaletteResponse),
        (status = 400, description = "Unknown palette type or invalid hex seed"),
    )
)]
pub async fn generate(
    State(_state): State<AppState>,
    Query(query): Query<PaletteQuery>,
) -> Result<Json<PaletteResponse>> {
    let kind = PaletteKind::parse(query.kind.as_deref().unwrap_or("analogous"))?;

    let seeds: Vec<String> = query
        .seeds
        .unwrap_or_else(|| DEFAULT_SEED.to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    let palettes = palette::build(kind, &seeds)?;

    Ok(Json(PaletteResponse {
        kind: kind.as_str().to_string(),
        palettes,
    }))
}
