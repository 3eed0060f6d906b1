use axum::{
    routing::{get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;

pub fn v1_router() -> Router<AppState> {
    let images = Router::new()
        .route("/to-base64", post(handlers::images::to_base64))
        .route("/from-base64", post(handlers::images::from_base64))
        .route("/convert", post(handlers::images::convert));

    let extract = Router::new()
        .route("/file", post(handlers::extract::extract_file))
        .route("/base64", post(handlers::extract::extract_base64));

    let analyze = Router::new()
        .route("/file", post(handlers::extract::analyze_file))
        .route("/base64", post(handlers::extract::analyze_base64));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router())
        .route("/pincode/{pincode}", get(handlers::pincode::get_pincode))
        .route("/qr", get(handlers::qr::generate))
        .route("/scrape", get(handlers::scrape::scrape))
        .route("/colors/palette", get(handlers::palette::generate))
        .nest("/images", images)
        .nest("/extract", extract)
        .nest("/analyze", analyze)
}
