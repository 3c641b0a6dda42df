/**
 * Local Password Strategy
 *
 * Single round trip: credentials arrive in the JSON request body and are
 * verified against the identity store's bcrypt hashes.
 */

use crate::auth::identity::{Identity, IdentityStore};
use crate::auth::strategy::Credentials;
use crate::error::GatewayError;

/// Password strategy over the local identity store
pub struct LocalStrategy;

impl LocalStrategy {
    /// Read `username` and `password` out of the request body
    ///
    /// # Errors
    ///
    /// * `MissingCredentials` - no body, or either field absent
    pub fn extract_credentials(
        &self,
        body: Option<&serde_json::Value>,
    ) -> Result<Credentials, GatewayError> {
        let body = body.ok_or_else(|| {
            GatewayError::missing_credentials("login requires a JSON body")
        })?;

        let field = |name: &str| {
            body.get(name)
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| GatewayError::missing_credentials(format!("{name} is required")))
        };

        Ok(Credentials::Password {
            username: field("username")?,
            password: field("password")?,
        })
    }

    /// Verify the pair against the identity store
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
        identities: &IdentityStore,
    ) -> Result<Identity, GatewayError> {
        identities.verify_password(username, password).await
    }
}
