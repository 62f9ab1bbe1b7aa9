use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    error::{ApiError, AppResult},
};

/// HS256 session token claims. `sub` is the user id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

pub fn create_token(secret: &[u8], user_id: i32, ttl_days: i64) -> AppResult<String> {
    let now = jiff::Timestamp::now().as_second();
    let claims =
        Claims { sub: user_id.to_string(), iat: now, exp: now + ttl_days * 86_400 };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret))
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("token signing failed: {e}")))
}

pub fn validate_token(secret: &[u8], token: &str) -> Option<i32> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).ok()?;
    data.claims.sub.parse().ok()
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// Handlers that mutate reviews take this as an argument; absence or an
/// invalid token rejects the request before the handler body runs.
pub struct AuthUser {
    pub user_id: i32,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let user_id = validate_token(state.config.auth_secret.as_bytes(), token)
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = create_token(b"test-secret", 42, 1).unwrap();
        assert_eq!(validate_token(b"test-secret", &token), Some(42));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = create_token(b"test-secret", 42, 1).unwrap();
        assert_eq!(validate_token(b"other-secret", &token), None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = jiff::Timestamp::now().as_second();
        let claims = Claims { sub: "42".to_string(), iat: now - 600, exp: now - 300 };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(validate_token(b"test-secret", &token), None);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(validate_token(b"test-secret", "not-a-token"), None);
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter22").unwrap();
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }
}
