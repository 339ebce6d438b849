use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub sub: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("JWT secret not configured")]
    InvalidSecret,
}

/// Issues and verifies the signed bearer tokens handed out at login/registration.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_hours: u64,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours,
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiry_hours)
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String, JwtError> {
        self.encode_claims(&Claims::new(user_id, self.expiry_hours))
    }

    /// Resolve a token to the user id it carries. Fails on expiry, bad signature or malformed input.
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidToken("JWT secret not configured".to_string()));
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims.sub)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        if self.secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", 24 * 30)
    }

    #[test]
    fn issued_token_verifies_to_same_user() {
        let user_id = Uuid::new_v4();
        let token = service().issue(user_id).unwrap();
        assert_eq!(service().verify(&token).unwrap(), user_id);
    }

    #[test]
    fn expiry_is_thirty_days_out() {
        let claims = Claims::new(Uuid::new_v4(), 24 * 30);
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn rejects_expired_token() {
        let svc = service();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = svc.encode_claims(&claims).unwrap();
        assert!(matches!(svc.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = TokenService::new("other-secret", 1).issue(Uuid::new_v4()).unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(service().verify("not-a-token").is_err());
        assert!(service().verify("").is_err());
    }

    #[test]
    fn empty_secret_cannot_issue() {
        let svc = TokenService::new("", 1);
        assert!(matches!(svc.issue(Uuid::new_v4()), Err(JwtError::InvalidSecret)));
    }
}
