use axum::extract::{Query, State};
use axum::Json;

use crate::api::v1::dto::ScrapeQuery;
use crate::api::AppState;
use crate::error::{KioskError, Result};
use crate::services::scrape::PageSummary;

/// `GET /api/v1/scrape`
#[utoipa::path(
    get,
    path = "/api/v1/scrape",
    tag = "scrape",
    operation_id = "scrape.page",
    params(ScrapeQuery),
    responses(
        (status = 200, description = "Structured page summary", body = PageSummary),
        (status = 400, description = "Missing or malformed url parameter"),
        (status = 502, description = "Site fetch failed"),
    )
)]
pub async fn scrape(
    State(state): State<AppState>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<PageSummary>> {
    let url = query
        .url
        .ok_or_else(|| KioskError::Validation("Missing ?url query param".into()))?;

    let page = state.scraper.scrape(&url).await?;
    Ok(Json(page))
}
