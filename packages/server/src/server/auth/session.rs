use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::common::UserId;

/// Session token (random UUID)
pub type SessionToken = String;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "sessionid";

/// Session data stored after a successful login
#[derive(Clone, Debug)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Severity of a flash notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlashLevel {
    Info,
    Success,
    Error,
}

/// A one-shot notice shown on the next rendered page.
#[derive(Clone, Debug)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// In-memory session store
///
/// Sessions expire after 24 hours. Flash notices ride along with the
/// session and are drained when the next page renders them.
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
    flashes: Arc<RwLock<HashMap<SessionToken, Vec<Flash>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            flashes: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a new session and return the token
    pub async fn create_session(&self, session: Session) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), session);
        token
    }

    /// Get session by token
    pub async fn get_session(&self, token: &str) -> Option<Session> {
        let sessions = self.sessions.read().await;
        let session = sessions.get(token)?;

        // Check if session is expired (24 hours)
        let now = chrono::Utc::now();
        let elapsed = now.signed_duration_since(session.created_at);
        if elapsed.num_hours() >= 24 {
            // Session expired
            return None;
        }

        Some(session.clone())
    }

    /// Delete session (logout), dropping any pending notices with it
    pub async fn delete_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        drop(sessions);

        let mut flashes = self.flashes.write().await;
        flashes.remove(token);
    }

    /// Clean up expired sessions (run periodically)
    pub async fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write().await;
        let now = chrono::Utc::now();

        sessions.retain(|_, session| {
            let elapsed = now.signed_duration_since(session.created_at);
            elapsed.num_hours() < 24
        });
    }

    /// Queue a notice for the session's next rendered page
    pub async fn push_flash(&self, token: &str, flash: Flash) {
        let mut flashes = self.flashes.write().await;
        flashes.entry(token.to_string()).or_default().push(flash);
    }

    /// Drain the session's pending notices
    pub async fn take_flashes(&self, token: &str) -> Vec<Flash> {
        let mut flashes = self.flashes.write().await;
        flashes.remove(token).unwrap_or_default()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: UserId::new(),
            username: "ana".to_string(),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_session_creation() {
        let store = SessionStore::new();
        let session = session();

        let token = store.create_session(session.clone()).await;
        assert!(!token.is_empty());

        let retrieved = store.get_session(&token).await;
        assert!(retrieved.is_some());
        assert_eq!(retrieved.unwrap().username, session.username);
    }

    #[tokio::test]
    async fn test_session_expiration() {
        let store = SessionStore::new();
        let session = Session {
            created_at: chrono::Utc::now() - chrono::Duration::hours(25),
            ..session()
        };

        let token = store.create_session(session).await;
        let retrieved = store.get_session(&token).await;
        assert!(retrieved.is_none(), "Expired session should return None");
    }

    #[tokio::test]
    async fn test_logout_deletes_session() {
        let store = SessionStore::new();
        let token = store.create_session(session()).await;

        store.delete_session(&token).await;
        assert!(store.get_session(&token).await.is_none());
    }

    #[tokio::test]
    async fn test_flashes_drain_on_take() {
        let store = SessionStore::new();
        let token = store.create_session(session()).await;

        store.push_flash(&token, Flash::success("Community created.")).await;
        store.push_flash(&token, Flash::info("You are the owner.")).await;

        let flashes = store.take_flashes(&token).await;
        assert_eq!(flashes.len(), 2);
        assert_eq!(flashes[0].level, FlashLevel::Success);

        // Second take is empty
        assert!(store.take_flashes(&token).await.is_empty());
    }
}
