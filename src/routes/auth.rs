use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, auth,
    entities::user,
    error::{ApiError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// User shape safe to put on the wire; never the entity with its hash.
#[derive(Debug, Serialize)]
pub struct UserPublic {
    pub id: i32,
    pub username: String,
    pub email: String,
}

impl From<user::Model> for UserPublic {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, username: u.username, email: u.email }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let username = req.username.trim();
    let email = req.email.trim();

    if username.is_empty() {
        return Err(ApiError::validation("username is required"));
    }
    if !email.contains('@') {
        return Err(ApiError::validation("a valid email is required"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation("password must be at least 6 characters"));
    }

    let hash = auth::hash_password(&req.password)?;
    let user = state.users.create(username, email, &hash).await?;
    let token = auth::create_token(
        state.config.auth_secret.as_bytes(),
        user.id,
        state.config.token_ttl_days,
    )?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user: user.into() })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_username(req.username.trim())
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::create_token(
        state.config.auth_secret.as_bytes(),
        user.id,
        state.config.token_ttl_days,
    )?;

    Ok(Json(AuthResponse { token, user: user.into() }))
}
