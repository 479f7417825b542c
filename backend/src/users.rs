use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use chrono::Utc;
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, AuthUser};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewUser, Status, User};
use crate::schema::{listings, users};
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_USERNAME_CHARS: usize = 150;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<serde_json::Value>)> {
    let username = request.username.trim().to_string();
    let mut bad: Vec<&str> = Vec::new();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        bad.push("username");
    }
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        bad.push("password");
    }
    if !bad.is_empty() {
        return Err(ApiError::validation(bad));
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(request.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))?
        .to_string();

    let user = NewUser {
        id: Uuid::new_v4(),
        username: username.clone(),
        password_hash,
        created_at: Utc::now().naive_utc(),
    };
    let mut conn = db::establish_connection(&state.config.database_url)?;
    if let Err(err) = diesel::insert_into(users::table).values(&user).execute(&mut conn) {
        let api: ApiError = err.into();
        if api.is_unique_violation() {
            return Err(ApiError::BusinessRule(
                "This username is already taken.".to_string(),
            ));
        }
        return Err(api);
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({"id": user.id, "username": user.username})),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let user: Option<User> = users::table
        .filter(users::username.eq(&request.username))
        .first(&mut conn)
        .optional()?;
    // Same rejection whether the username or the password is wrong.
    let Some(user) = user else {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    let parsed = PasswordHash::new(&user.password_hash)
        .map_err(|e| ApiError::Internal(format!("stored hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(request.password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let token = auth::create_token(user.id, &state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(format!("token issuance failed: {e}")))?;
    Ok(Json(json!({"token": token})))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> ApiResult<Json<serde_json::Value>> {
    let mut conn = db::establish_connection(&state.config.database_url)?;
    let user: User = users::table.find(user_id).first(&mut conn)?;

    // Derived on read rather than kept as counters on the user row.
    let active_listings: i64 = listings::table
        .filter(listings::seller_id.eq(user_id))
        .filter(listings::status.eq(Status::Published.as_str()))
        .count()
        .get_result(&mut conn)?;
    let sold_listings: i64 = listings::table
        .filter(listings::seller_id.eq(user_id))
        .filter(listings::status.eq(Status::Sold.as_str()))
        .count()
        .get_result(&mut conn)?;

    Ok(Json(json!({
        "id": user.id,
        "username": user.username,
        "active_listings": active_listings,
        "sold_listings": sold_listings,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trips() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct horse battery", &salt)
            .expect("hash")
            .to_string();
        let parsed = PasswordHash::new(&hash).expect("parse");
        assert!(Argon2::default()
            .verify_password(b"correct horse battery", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong password", &parsed)
            .is_err());
    }
}
