use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// Issues and verifies signed access tokens.
///
/// Uses HS256 with a process-wide secret, loaded once at startup. Verification
/// is stateless: there is no server-side token registry and no revocation.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a handler from the signing secret.
    ///
    /// The secret should be at least 32 bytes for HS256 and must come from
    /// configuration, never from code.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Sign claims into an opaque token string.
    ///
    /// # Errors
    /// * `EncodingFailed` - serialization or signing failed
    pub fn issue(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// # Errors
    /// * `Expired` - well-formed token past its `exp`
    /// * `InvalidSignature` - signature does not match the secret
    /// * `Malformed` - anything else that is not a valid token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::new(self.algorithm);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    _ => JwtError::Malformed(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    #[test]
    fn issue_and_verify_round_trip() {
        let handler = JwtHandler::new(SECRET);

        let claims = Claims::for_user("user123", "alice");
        let token = handler.issue(&claims).expect("Failed to issue token");
        assert!(!token.is_empty());

        let decoded = handler.verify(&token).expect("Failed to verify token");
        assert_eq!(decoded, claims);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let handler = JwtHandler::new(SECRET);

        // Expired well past jsonwebtoken's default 60s leeway.
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user123".to_string(),
            username: "alice".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };

        let token = handler.issue(&claims).expect("Failed to issue token");
        let result = handler.verify(&token);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let issuer = JwtHandler::new(SECRET);
        let verifier = JwtHandler::new(b"another_secret_at_least_32_bytes!!");

        let token = issuer
            .issue(&Claims::for_user("user123", "alice"))
            .expect("Failed to issue token");

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(JwtError::InvalidSignature)));
    }

    #[test]
    fn verify_rejects_malformed_token() {
        let handler = JwtHandler::new(SECRET);

        for garbage in ["", "garbage", "a.b.c", "almost.a token"] {
            let result = handler.verify(garbage);
            assert!(
                matches!(result, Err(JwtError::Malformed(_))),
                "expected Malformed for {:?}",
                garbage
            );
        }
    }
}
