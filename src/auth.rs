//! Identity resolution and permission gating
//!
//! The identity resolver turns a request into the acting user by following
//! the `session_id` cookie through the session store to the users table.
//! Role checks are explicit capability predicates invoked per operation,
//! not a permission-class hierarchy.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

use crate::db;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::session::SESSION_COOKIE;
use crate::AppState;

/// The acting user for a request, or anonymous.
#[derive(Debug, Clone)]
pub struct Identity(pub Option<User>);

impl Identity {
    /// Require any authenticated user.
    pub fn authenticated(self) -> Result<User> {
        self.0.ok_or(AppError::Unauthorized)
    }

    /// Require a user allowed to shop. Any authenticated account qualifies.
    pub fn buyer(self) -> Result<User> {
        self.authenticated()
    }

    /// Require a moderator account.
    pub fn moderator(self) -> Result<User> {
        let user = self.authenticated()?;
        if user.is_moderator {
            Ok(user)
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self> {
        let state = AppState::from_ref(state);

        let Some(token) = session_token(&parts.headers) else {
            return Ok(Identity(None));
        };

        let Some(user_id) = state.sessions.get(&token).await else {
            return Ok(Identity(None));
        };

        let user = db::get_user_by_id(&state.db, user_id).await?;
        Ok(Identity(user))
    }
}

/// Extract the raw session token from the request, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Build a `Set-Cookie` value installing the session token.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Build a `Set-Cookie` value clearing the session cookie.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Hash a password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored PHC-format hash.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
