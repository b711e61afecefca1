//! HTTP route handlers and router assembly

pub mod tariffs;
pub mod users;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::forecast;
use crate::AppState;

/// Liveness probe with session store statistics
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "sessions": state.sessions.stats(),
    }))
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/tariffs", tariffs::router())
        .nest("/api/forecasts", forecast::router())
        .nest("/api", users::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
