use thiserror::Error;

/// Error type for JWT operations.
///
/// `Expired`, `InvalidSignature` and `Malformed` are kept as separate
/// variants for diagnostics; callers that only need a yes/no answer
/// collapse all of them to `false`.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token signature does not match")]
    InvalidSignature,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}
