use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Token lifetime, applied at issuance. Not configurable per call.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Identity payload carried by an access token.
///
/// `sub` holds the user id, `username` the login name. `iat` and `exp` are
/// Unix timestamps stamped when the claims are built for a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Build claims for a freshly authenticated user.
    ///
    /// Expiry is fixed to [`TOKEN_TTL_SECS`] from now.
    pub fn for_user(user_id: impl ToString, username: impl Into<String>) -> Self {
        let now = Utc::now().timestamp();

        Self {
            sub: user_id.to_string(),
            username: username.into(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        }
    }

    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp < current_timestamp
    }
}
