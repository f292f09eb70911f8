use super::ApiError;
use crate::db::Credential;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use twilight_model::id::{marker::UserMarker, Id};

#[derive(Debug, Deserialize)]
pub(crate) struct SaveToken {
    #[serde(default)]
    token: String,
}

#[derive(Debug, Serialize)]
struct Saved {
    success: bool,
    key: String,
    user_id: Id<UserMarker>,
    username: String,
}

/// Stores a user token after resolving the identity it belongs to.
pub(crate) async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveToken>,
) -> Result<impl IntoResponse, ApiError> {
    if request.token.trim().is_empty() {
        return Err(ApiError::TokenRequired);
    }
    let user = state
        .discord
        .current_user(&request.token)
        .await
        .map_err(ApiError::InvalidToken)?;

    let credential = Credential::new(user.id, user.username, request.token);
    state.store.save(&credential).await?;
    info!(user_id = credential.user_id.get(), "saved credential");

    Ok((
        StatusCode::CREATED,
        Json(Saved {
            success: true,
            key: credential.key,
            user_id: credential.user_id,
            username: credential.username,
        }),
    ))
}

pub(crate) async fn show(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let credential = state.store.get(&key).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(json!({
        "user_id": credential.user_id,
        "username": credential.username,
        "has_token": true,
        "updated": credential.updated.to_rfc3339(),
    })))
}

/// Forgets a credential and stops its running sweeps.
pub(crate) async fn forget(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.sweeps.cancel(&key);
    if !state.store.remove(&key).await? {
        return Err(ApiError::NotFound);
    }
    info!("forgot credential");
    Ok(StatusCode::NO_CONTENT)
}
