//! Session storage using moka
//!
//! Maps an opaque session token to a user id. Injected into the app state
//! (rather than process-global) so the workflow stays testable in isolation.
//! Entries expire on TTL; logout deletes eagerly.

use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session_id";

/// Key-value session store (token -> user id)
#[derive(Clone)]
pub struct SessionStore {
    sessions: Cache<String, Uuid>,
}

impl SessionStore {
    /// Create a store whose entries live at most `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(100_000)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Mint a fresh opaque token for `user_id` and register it.
    pub async fn create(&self, user_id: Uuid) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(token.clone(), user_id).await;
        token
    }

    /// Resolve a token to the user it belongs to, if still live.
    pub async fn get(&self, token: &str) -> Option<Uuid> {
        self.sessions.get(token).await
    }

    /// Delete a session (logout).
    pub async fn delete(&self, token: &str) {
        self.sessions.invalidate(token).await;
    }

    /// Store statistics for monitoring.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            live_sessions: self.sessions.entry_count(),
        }
    }
}

/// Session store statistics
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub live_sessions: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_resolves_user() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let token = store.create(user).await;
        assert_eq!(store.get(&token).await, Some(user));
    }

    #[tokio::test]
    async fn delete_revokes_token() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let token = store.create(user).await;
        store.delete(&token).await;
        assert_eq!(store.get(&token).await, None);
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let store = SessionStore::new(Duration::from_secs(60));
        assert_eq!(store.get("no-such-token").await, None);
    }

    #[tokio::test]
    async fn tokens_are_unique_per_session() {
        let store = SessionStore::new(Duration::from_secs(60));
        let user = Uuid::new_v4();

        let a = store.create(user).await;
        let b = store.create(user).await;
        assert_ne!(a, b);
        assert_eq!(store.get(&a).await, Some(user));
        assert_eq!(store.get(&b).await, Some(user));
    }
}
