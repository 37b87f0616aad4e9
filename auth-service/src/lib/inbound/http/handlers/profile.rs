use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedUser;

/// Returns the identity of the authenticated caller, as extracted from the
/// verified bearer token by the auth middleware.
pub async fn profile(
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ApiSuccess<ProfileResponseData>, ApiError> {
    Ok(ApiSuccess::new(
        StatusCode::OK,
        ProfileResponseData {
            user_id: user.user_id.to_string(),
            username: user.username,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponseData {
    pub user_id: String,
    pub username: String,
}
