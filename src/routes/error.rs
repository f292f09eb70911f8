use crate::discord::DiscordError;
use crate::sweep::SweepError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("token is required")]
    TokenRequired,
    #[error("could not verify token: {0}")]
    InvalidToken(#[source] DiscordError),
    #[error("credential not found")]
    NotFound,
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error("credential store failed: {0}")]
    Store(#[from] sqlx::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::TokenRequired => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Sweep(SweepError::Store(_)) | ApiError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Sweep(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::TokenRequired => "token_required",
            ApiError::InvalidToken(_) => "invalid_token",
            ApiError::NotFound => "not_found",
            ApiError::Sweep(SweepError::MissingCredential) => "token_not_configured",
            ApiError::Sweep(SweepError::MissingChannelId) => "channel_id_required",
            ApiError::Sweep(SweepError::InvalidChannelId(_)) => "invalid_channel_id",
            ApiError::Sweep(SweepError::Store(_)) | ApiError::Store(_) => "storage_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            debug!(error = %self, "request rejected");
        }
        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
