/**
 * Authentication Handler Types
 *
 * Request and response bodies shared across the authentication handlers.
 */

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::auth::identity::Identity;

/// Local account registration request
#[derive(Debug, Deserialize, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    /// Hashed before storage, never logged
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Identity information safe to return to clients
///
/// Never includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub id: String,
    pub provider: String,
    pub account: String,
    pub display: HashMap<String, String>,
}

impl From<Identity> for IdentityResponse {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id.to_string(),
            provider: identity.provider.as_str().to_string(),
            account: identity.provider_account_id,
            display: identity.display_attributes,
        }
    }
}

/// Successful authentication response
///
/// The session itself travels in the cookie, not the body.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: IdentityResponse,
}
