use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::v1;
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The absolute buffer ceiling applies to every route; the tighter
    // per-endpoint ceilings are enforced in the handlers.
    let body_ceiling = state.config.ocr.absolute_max_bytes;

    let v1 = v1::router::v1_router();

    Router::new()
        .nest("/api/v1", v1)
        .layer(DefaultBodyLimit::max(body_ceiling))
        .layer(RequestBodyLimitLayer::new(body_ceiling))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
