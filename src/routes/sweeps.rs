use super::ApiError;
use crate::state::AppState;
use crate::sweep::{self, SweepReport, SweepRequest};
use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use tracing::info;

/// Runs a sweep and answers once it is done.
pub(crate) async fn start(
    State(state): State<AppState>,
    Json(request): Json<SweepRequest>,
) -> Result<Json<SweepReport>, ApiError> {
    Ok(Json(sweep::run(&state, request).await?))
}

pub(crate) async fn cancel(State(state): State<AppState>, Path(key): Path<String>) -> Json<Value> {
    let cancelled = state.sweeps.cancel(&key);
    info!(cancelled, "cancel requested");
    Json(json!({ "cancelled": cancelled }))
}
