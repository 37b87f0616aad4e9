use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;
use crate::inbound::http::router::AppState;

/// Synchronous twin of the async validation protocol. Always answers 200
/// with a boolean; invalid input is a `false`, not an error.
pub async fn validate_token<R: UserRepository>(
    State(state): State<AppState<R>>,
    Json(body): Json<ValidateTokenRequestBody>,
) -> Result<ApiSuccess<ValidateTokenResponseData>, ApiError> {
    let valid = state.auth_service.validate_token(&body.token).await;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        ValidateTokenResponseData { valid },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateTokenRequestBody {
    token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateTokenResponseData {
    pub valid: bool,
}
