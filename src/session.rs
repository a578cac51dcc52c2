//! Per-chat session storage
//!
//! One session per chat identifier, replaced or cleared as a whole. The
//! runtime owns each chat's read-modify-write cycle, so stores only need to
//! be safe for concurrent access across different chats.

use crate::state_machine::FlowState;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// An in-progress flow for one chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub chat_id: String,
    pub state: FlowState,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(chat_id: impl Into<String>, state: FlowState) -> Self {
        Self {
            chat_id: chat_id.into(),
            state,
            updated_at: Utc::now(),
        }
    }
}

/// Storage for chat sessions
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Get the chat's live session, if any
    async fn get(&self, chat_id: &str) -> Result<Option<Session>, String>;

    /// Replace the chat's session
    async fn set(&self, session: Session) -> Result<(), String>;

    /// Refresh the session's activity time, leaving its state as is
    async fn touch(&self, chat_id: &str) -> Result<(), String>;

    /// Remove the chat's session
    async fn clear(&self, chat_id: &str) -> Result<(), String>;
}

#[async_trait]
impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    async fn get(&self, chat_id: &str) -> Result<Option<Session>, String> {
        (**self).get(chat_id).await
    }

    async fn set(&self, session: Session) -> Result<(), String> {
        (**self).set(session).await
    }

    async fn touch(&self, chat_id: &str) -> Result<(), String> {
        (**self).touch(chat_id).await
    }

    async fn clear(&self, chat_id: &str) -> Result<(), String> {
        (**self).clear(chat_id).await
    }
}

/// Process-memory session store with optional idle expiry.
///
/// A session untouched for longer than the TTL reads as absent; the chat is
/// back to `Idle` without anyone having to cancel the abandoned flow.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Option<Duration>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Some(ttl),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        self.ttl
            .is_some_and(|ttl| now.signed_duration_since(session.updated_at) > ttl)
    }

    /// Number of stored sessions, expired ones included
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, chat_id: &str) -> Result<Option<Session>, String> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(chat_id) {
                None => return Ok(None),
                Some(session) if !self.is_expired(session, now) => {
                    return Ok(Some(session.clone()));
                }
                Some(_) => {}
            }
        }

        // Expired: drop it unless it was refreshed in the meantime
        let mut sessions = self.sessions.write().await;
        if sessions
            .get(chat_id)
            .is_some_and(|s| self.is_expired(s, now))
        {
            tracing::debug!(chat_id, "Session expired");
            sessions.remove(chat_id);
        }
        Ok(sessions.get(chat_id).cloned())
    }

    async fn set(&self, session: Session) -> Result<(), String> {
        self.sessions
            .write()
            .await
            .insert(session.chat_id.clone(), session);
        Ok(())
    }

    async fn touch(&self, chat_id: &str) -> Result<(), String> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        // An already expired session stays expired
        if let Some(session) = sessions.get_mut(chat_id) {
            if !self.is_expired(session, now) {
                session.updated_at = now;
            }
        }
        Ok(())
    }

    async fn clear(&self, chat_id: &str) -> Result<(), String> {
        self.sessions.write().await.remove(chat_id);
        Ok(())
    }
}
