use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User id
    pub exp: usize,  // Expiration time
}

/// Authenticated principal, injected into request extensions by the bearer
/// middleware.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Uuid);

pub fn create_token(user_id: Uuid, jwt_secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expiration,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Uuid, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;
    Uuid::parse_str(&token_data.claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid token subject".to_string()))
}

/// Pulls the bearer principal out of the request headers. `Ok(None)` means no
/// credentials were presented at all; a malformed or expired token is an
/// error, not anonymity.
pub fn user_from_headers(headers: &HeaderMap, jwt_secret: &str) -> Result<Option<Uuid>, ApiError> {
    let Some(header) = headers.get("Authorization") else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::Unauthorized("Invalid Authorization header format".to_string())
    })?;
    validate_token(token, jwt_secret).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trips() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, SECRET).expect("token");
        assert_eq!(validate_token(&token, SECRET).expect("valid"), user_id);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token(Uuid::new_v4(), SECRET).expect("token");
        assert!(validate_token(&token, "other-secret").is_err());
        assert!(validate_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn missing_header_is_anonymous() {
        let headers = HeaderMap::new();
        assert!(user_from_headers(&headers, SECRET).expect("ok").is_none());
    }

    #[test]
    fn malformed_header_is_an_error() {
        let mut headers = HeaderMap::new();
        headers.insert("Authorization", HeaderValue::from_static("Token abc"));
        assert!(user_from_headers(&headers, SECRET).is_err());
    }

    #[test]
    fn bearer_header_resolves_user() {
        let user_id = Uuid::new_v4();
        let token = create_token(user_id, SECRET).expect("token");
        let mut headers = HeaderMap::new();
        headers.insert(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        assert_eq!(user_from_headers(&headers, SECRET).expect("ok"), Some(user_id));
    }
}
