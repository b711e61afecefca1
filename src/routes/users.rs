//! User account and session route handlers

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{self, Identity};
use crate::db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/users/me", get(me).put(update_profile))
}

/// User profile as returned to clients (never the hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub is_moderator: bool,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            is_moderator: u.is_moderator,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::validation("username must not be empty"));
    }
    if password.len() < 4 {
        return Err(AppError::validation("password is too short"));
    }
    Ok(())
}

/// Build a response carrying the user profile and a fresh session cookie.
async fn session_response(
    state: &AppState,
    user: User,
    status: StatusCode,
) -> Result<Response> {
    let token = state.sessions.create(user.id).await;
    let cookie = auth::session_cookie(&token)
        .parse()
        .map_err(|_| AppError::Internal("invalid session cookie".to_string()))?;

    let mut response = (status, Json(UserResponse::from(user))).into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// Create an account and start a session
async fn register(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Response> {
    validate_credentials(&request.username, &request.password)?;

    if db::get_user_by_username(&state.db, &request.username)
        .await?
        .is_some()
    {
        return Err(AppError::conflict("username already taken"));
    }

    let hash = auth::hash_password(&request.password)?;
    let user = db::create_user(&state.db, &request.username, &hash, false).await?;
    tracing::info!(user_id = %user.id, "user registered");

    session_response(&state, user, StatusCode::CREATED).await
}

/// Verify credentials and start a session
async fn login(
    State(state): State<AppState>,
    Json(request): Json<CredentialsRequest>,
) -> Result<Response> {
    let user = db::get_user_by_username(&state.db, &request.username)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !auth::verify_password(&request.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    session_response(&state, user, StatusCode::OK).await
}

/// End the current session and clear the cookie
async fn logout(
    State(state): State<AppState>,
    identity: Identity,
    headers: HeaderMap,
) -> Result<Response> {
    identity.authenticated()?;

    if let Some(token) = auth::session_token(&headers) {
        state.sessions.delete(&token).await;
    }

    let cookie = auth::clear_session_cookie()
        .parse()
        .map_err(|_| AppError::Internal("invalid session cookie".to_string()))?;
    let mut response = StatusCode::OK.into_response();
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// Current user's profile
async fn me(identity: Identity) -> Result<Json<UserResponse>> {
    let user = identity.authenticated()?;
    Ok(Json(user.into()))
}

/// Partial profile update; a new password is re-hashed
async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let user = identity.authenticated()?;

    if let Some(username) = &request.username {
        if username.trim().is_empty() {
            return Err(AppError::validation("username must not be empty"));
        }
        if username != &user.username
            && db::get_user_by_username(&state.db, username).await?.is_some()
        {
            return Err(AppError::conflict("username already taken"));
        }
    }
    let password_hash = match &request.password {
        Some(password) => {
            if password.len() < 4 {
                return Err(AppError::validation("password is too short"));
            }
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    let updated = db::update_user(
        &state.db,
        user.id,
        request.username.as_deref(),
        password_hash.as_deref(),
    )
    .await?;
    Ok(Json(updated.into()))
}
