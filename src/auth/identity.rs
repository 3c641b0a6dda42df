/**
 * Identity Model and Store
 *
 * The canonical, de-duplicated representation of an authenticated user,
 * independent of which login method was used, plus the in-process store
 * the credential verifier runs against.
 */

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::GatewayError;

/// Authentication provider an identity originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Local,
    Google,
    Facebook,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified user identity
///
/// The `{provider, provider_account_id}` pair is immutable once created;
/// display attributes may be refreshed on later logins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identity ID
    pub id: Uuid,
    /// Provider that verified this identity
    pub provider: Provider,
    /// Account key within the provider (username for local accounts)
    pub provider_account_id: String,
    /// Profile attributes from the provider (name, email, picture, ...)
    pub display_attributes: HashMap<String, String>,
    /// Bcrypt hash, local accounts only
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    /// Created at timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, Identity>,
    by_account: HashMap<(Provider, String), Uuid>,
}

/// Process-wide identity store
///
/// Shared by reference into the pipeline; all mutations happen under a
/// single write lock so a `{provider, account}` pair is created at most
/// once even under concurrent callback replays.
#[derive(Clone, Default)]
pub struct IdentityStore {
    inner: Arc<RwLock<Inner>>,
}

impl IdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a local account
    ///
    /// Hashes the password with bcrypt and creates a `Provider::Local`
    /// identity keyed on the username.
    ///
    /// # Errors
    ///
    /// * `InvalidRequest` - username already registered or blank input
    /// * `Internal` - hashing failure
    pub async fn register_local(
        &self,
        username: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, GatewayError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(GatewayError::invalid_request(
                "username and password are required",
            ));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| GatewayError::internal(format!("password hashing failed: {e}")))?;

        let mut display_attributes = HashMap::new();
        if let Some(name) = display_name {
            display_attributes.insert("name".to_string(), name.to_string());
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            provider: Provider::Local,
            provider_account_id: username.to_string(),
            display_attributes,
            password_hash: Some(password_hash),
            created_at: Utc::now(),
        };

        let mut inner = self.inner.write().await;
        let key = (Provider::Local, username.to_string());
        if inner.by_account.contains_key(&key) {
            return Err(GatewayError::invalid_request("account already exists"));
        }
        inner.by_account.insert(key, identity.id);
        inner.by_id.insert(identity.id, identity.clone());

        tracing::info!(username, id = %identity.id, "registered local identity");
        Ok(identity)
    }

    /// Verify a local username/password pair
    ///
    /// Absent accounts and wrong passwords both collapse to
    /// `InvalidCredentials` so the response does not enumerate users.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, GatewayError> {
        let identity = self
            .find(Provider::Local, username)
            .await
            .ok_or(GatewayError::InvalidCredentials)?;

        let hash = identity
            .password_hash
            .as_deref()
            .ok_or(GatewayError::InvalidCredentials)?;

        let valid = bcrypt::verify(password, hash)
            .map_err(|e| GatewayError::internal(format!("password verification failed: {e}")))?;

        if !valid {
            tracing::warn!(username, "password verification failed");
            return Err(GatewayError::InvalidCredentials);
        }

        Ok(identity)
    }

    /// Find or create the identity for a provider account
    ///
    /// Idempotent: a second caller for the same `{provider, account}` pair
    /// observes the existing identity (with its attributes refreshed) and
    /// never creates a duplicate. The check and the insert happen under one
    /// write lock.
    pub async fn find_or_create(
        &self,
        provider: Provider,
        provider_account_id: &str,
        display_attributes: HashMap<String, String>,
    ) -> Identity {
        let mut inner = self.inner.write().await;
        let key = (provider, provider_account_id.to_string());

        if let Some(id) = inner.by_account.get(&key).copied() {
            let identity = inner
                .by_id
                .get_mut(&id)
                .expect("account index points at a live identity");
            identity.display_attributes = display_attributes;
            return identity.clone();
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            provider,
            provider_account_id: provider_account_id.to_string(),
            display_attributes,
            password_hash: None,
            created_at: Utc::now(),
        };
        inner.by_account.insert(key, identity.id);
        inner.by_id.insert(identity.id, identity.clone());

        tracing::info!(%provider, account = provider_account_id, id = %identity.id,
            "created identity on first login");
        identity
    }

    /// Get identity by ID
    pub async fn get(&self, id: Uuid) -> Option<Identity> {
        self.inner.read().await.by_id.get(&id).cloned()
    }

    /// Find identity by provider account
    pub async fn find(&self, provider: Provider, provider_account_id: &str) -> Option<Identity> {
        let inner = self.inner.read().await;
        let id = inner
            .by_account
            .get(&(provider, provider_account_id.to_string()))?;
        inner.by_id.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_and_verify() {
        let store = IdentityStore::new();
        let identity = store
            .register_local("alice", "password123", Some("Alice"))
            .await
            .unwrap();
        assert_eq!(identity.provider, Provider::Local);
        assert_eq!(identity.provider_account_id, "alice");

        let verified = store.verify_password("alice", "password123").await.unwrap();
        assert_eq!(verified.id, identity.id);
    }

    #[tokio::test]
    async fn test_verify_wrong_password() {
        let store = IdentityStore::new();
        store
            .register_local("alice", "password123", None)
            .await
            .unwrap();

        let result = store.verify_password("alice", "wrong").await;
        assert!(matches!(result, Err(GatewayError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_verify_unknown_user() {
        let store = IdentityStore::new();
        let result = store.verify_password("nobody", "password123").await;
        assert!(matches!(result, Err(GatewayError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let store = IdentityStore::new();
        store
            .register_local("alice", "password123", None)
            .await
            .unwrap();
        let result = store.register_local("alice", "other", None).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = IdentityStore::new();
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), "Bob".to_string());

        let first = store
            .find_or_create(Provider::Google, "account-1", attrs.clone())
            .await;

        attrs.insert("name".to_string(), "Robert".to_string());
        let second = store
            .find_or_create(Provider::Google, "account-1", attrs)
            .await;

        assert_eq!(first.id, second.id);
        // attributes refreshed on the second login
        assert_eq!(second.display_attributes["name"], "Robert");
    }

    #[tokio::test]
    async fn test_find_or_create_concurrent_replay() {
        let store = IdentityStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .find_or_create(Provider::Facebook, "fb-123", HashMap::new())
                    .await
                    .id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.dedup();
        assert_eq!(ids.len(), 1, "concurrent callbacks must not duplicate the identity");
    }

    #[tokio::test]
    async fn test_distinct_providers_distinct_identities() {
        let store = IdentityStore::new();
        let a = store
            .find_or_create(Provider::Google, "same-key", HashMap::new())
            .await;
        let b = store
            .find_or_create(Provider::Facebook, "same-key", HashMap::new())
            .await;
        assert_ne!(a.id, b.id);
    }
}
