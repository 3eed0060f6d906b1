use axum::extract::{Path, State};
use axum::Json;

use crate::api::v1::dto::PincodeResponse;
use crate::api::AppState;
use crate::error::Result;

/// `GET /api/v1/pincode/{pincode}`
#[utoipa::path(
    get,
    path = "/api/v1/pincode/{pincode}",
    tag = "pincode",
    operation_id = "pincode.lookup",
    params(
        ("pincode" = String, Path, description = "6-digit Indian pincode"),
    ),
    responses(
        (status = 200, description = "Resolved city and state", body = PincodeResponse),
        (status = 400, description = "Pincode is not a 6-digit number"),
        (status = 502, description = "Location lookup failed upstream"),
    )
)]
pub async fn get_pincode(
    State(state): State<AppState>,
    Path(pincode): Path<String>,
) -> Result<Json<PincodeResponse>> {
    let (location, cached) = state.pincode.lookup(&pincode).await?;

    Ok(Json(PincodeResponse {
        pincode,
        city: location.city,
        state: location.state,
        cached,
    }))
}
