use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/recommendations", recommendation_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(CorsLayer::permissive())
}

/// Recommendation routes under /api/recommendations
fn recommendation_routes() -> Router<AppState> {
    Router::new()
        .route("/trending", get(handlers::trending))
        .route("/trending/refresh", post(handlers::refresh_trending))
        .route("/personalized/:user_id", get(handlers::personalized))
        .route("/genre/:genre_id", get(handlers::by_genre))
        .route("/similar/:film_id", get(handlers::similar))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
