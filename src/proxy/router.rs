use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Browser-facing pass-through: permissive CORS, GET only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/api/pm/trades", get(handlers::trades))
        .route("/api/pm/positions", get(handlers::positions))
        .route("/api/pm/markets", get(handlers::markets))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
