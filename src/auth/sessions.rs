/**
 * Session Store
 *
 * Maps opaque session tokens to identity references. Tokens are random,
 * high-entropy, and mean nothing to the client; lifetime is fixed at
 * creation (no sliding renewal).
 */

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token length in characters (~285 bits of entropy)
const TOKEN_LEN: usize = 48;

/// A server-held session granting continued authenticated access
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque bearer token, also the store key
    pub token: String,
    /// Identity this session was created for
    pub identity_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Process-wide session store
///
/// Concurrent create/destroy for different tokens do not interfere;
/// destroying the same token twice is a no-op on the second call.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn generate_token() -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(TOKEN_LEN)
            .map(char::from)
            .collect()
    }

    /// Create a session for an identity
    pub async fn create(&self, identity_id: Uuid) -> Session {
        let now = Utc::now();
        let mut inner = self.inner.write().await;

        // collision probability is negligible, but the store never
        // overwrites a live session
        let token = loop {
            let candidate = Self::generate_token();
            if !inner.contains_key(&candidate) {
                break candidate;
            }
        };

        let session = Session {
            token: token.clone(),
            identity_id,
            created_at: now,
            expires_at: now + self.ttl,
        };
        inner.insert(token, session.clone());
        tracing::debug!(identity = %identity_id, expires_at = %session.expires_at, "session created");
        session
    }

    /// Resolve a token to a live session
    ///
    /// Expiry is advisory: a `get` on an expired token returns `None` and
    /// eagerly removes the entry.
    pub async fn get(&self, token: &str) -> Option<Session> {
        {
            let inner = self.inner.read().await;
            match inner.get(token) {
                Some(session) if !session.is_expired() => return Some(session.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // expired: re-check under the write lock before evicting
        let mut inner = self.inner.write().await;
        if inner.get(token).is_some_and(|s| s.is_expired()) {
            inner.remove(token);
            tracing::debug!("evicted expired session");
        }
        None
    }

    /// Destroy a session (idempotent)
    pub async fn destroy(&self, token: &str) {
        if self.inner.write().await.remove(token).is_some() {
            tracing::debug!("session destroyed");
        }
    }

    /// Number of live entries, expired included until eviction
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = SessionStore::new(Duration::hours(1));
        let identity_id = Uuid::new_v4();
        let session = store.create(identity_id).await;

        assert_eq!(session.token.len(), TOKEN_LEN);
        let resolved = store.get(&session.token).await.unwrap();
        assert_eq!(resolved.identity_id, identity_id);
    }

    #[tokio::test]
    async fn test_get_unknown_token() {
        let store = SessionStore::new(Duration::hours(1));
        assert!(store.get("not-a-token").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.create(Uuid::new_v4()).await;

        assert!(store.get(&session.token).await.is_none());
        // eager cleanup removed the entry
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent() {
        let store = SessionStore::new(Duration::hours(1));
        let session = store.create(Uuid::new_v4()).await;

        store.destroy(&session.token).await;
        assert!(store.get(&session.token).await.is_none());
        // second destroy is a no-op, not an error
        store.destroy(&session.token).await;
    }

    #[tokio::test]
    async fn test_tokens_are_distinct() {
        let store = SessionStore::new(Duration::hours(1));
        let a = store.create(Uuid::new_v4()).await;
        let b = store.create(Uuid::new_v4()).await;
        assert_ne!(a.token, b.token);
    }

    #[tokio::test]
    async fn test_concurrent_create_destroy_different_tokens() {
        let store = SessionStore::new(Duration::hours(1));
        let keep = store.create(Uuid::new_v4()).await;

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let session = store.create(Uuid::new_v4()).await;
                store.destroy(&session.token).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // unrelated create/destroy churn must not touch other sessions
        assert!(store.get(&keep.token).await.is_some());
    }
}
