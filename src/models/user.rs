//! User account model

use sqlx::FromRow;
use uuid::Uuid;

/// User account from the database
///
/// Moderators double as privileged administrators for visibility rules.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_moderator: bool,
}
