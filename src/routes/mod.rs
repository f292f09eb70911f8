mod credentials;
mod error;
mod sweeps;

pub(crate) use error::ApiError;

use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/credentials", post(credentials::save))
        .route(
            "/credentials/{key}",
            get(credentials::show).delete(credentials::forget),
        )
        .route("/credentials/{key}/cancel", post(sweeps::cancel))
        .route("/sweeps", post(sweeps::start))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "active_sweeps": state.sweeps.len(),
    }))
}
