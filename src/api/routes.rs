use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::api_info))
        // League data endpoints
        .route("/api/data", get(handlers::get_data))
        .route("/api/standings", get(handlers::get_standings))
        .route("/api/results", get(handlers::get_results))
        .route("/api/upcoming", get(handlers::get_upcoming))
        .route("/api/stats", get(handlers::get_stats_leaders))
        .route("/api/games/:id", get(handlers::get_game_by_id))
        // Refresh endpoints
        .route("/api/status", get(handlers::get_status))
        .route("/api/refresh", post(handlers::refresh))
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
