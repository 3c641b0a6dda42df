/**
 * OAuth Authorization-Code Strategy
 *
 * Two round trips: the first request redirects the client to the provider's
 * consent URL; the callback carries an authorization code which is exchanged
 * for a provider token and then a profile. CSRF state and the PKCE verifier
 * live server-side with a bounded lifetime between the two.
 *
 * Google and Facebook differ only in their endpoint set; the exchange logic
 * is shared.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};

use crate::auth::identity::{Identity, IdentityStore, Provider};
use crate::auth::strategy::Credentials;
use crate::error::GatewayError;

/// How long a started consent flow may wait for its callback
const PENDING_TTL_SECS: i64 = 600;

/// OAuth client type with auth URL and token URL set
type ConfiguredClient = oauth2::Client<
    oauth2::basic::BasicErrorResponse,
    oauth2::basic::BasicTokenResponse,
    oauth2::basic::BasicTokenIntrospectionResponse,
    oauth2::StandardRevocableToken,
    oauth2::basic::BasicRevocationErrorResponse,
    EndpointSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointNotSet,
    EndpointSet,
>;

/// Endpoint set for one provider
#[derive(Debug, Clone)]
pub struct OAuthEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
}

impl OAuthEndpoints {
    pub fn google() -> Self {
        Self {
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
        }
    }

    pub fn facebook() -> Self {
        Self {
            auth_url: "https://www.facebook.com/v19.0/dialog/oauth".to_string(),
            token_url: "https://graph.facebook.com/v19.0/oauth/access_token".to_string(),
            userinfo_url: "https://graph.facebook.com/me?fields=id,name,email".to_string(),
            scopes: vec!["email".to_string(), "public_profile".to_string()],
        }
    }
}

/// A consent flow waiting for its callback
struct PendingAuthorization {
    pkce_verifier: String,
    issued_at: DateTime<Utc>,
}

impl PendingAuthorization {
    fn is_expired(&self) -> bool {
        Utc::now() - self.issued_at > chrono::Duration::seconds(PENDING_TTL_SECS)
    }
}

/// Authorization-code strategy for one provider
pub struct OAuthStrategy {
    provider: Provider,
    client_id: ClientId,
    client_secret: ClientSecret,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    redirect_url: RedirectUrl,
    userinfo_url: String,
    scopes: Vec<Scope>,
    http: reqwest::Client,
    pending: Arc<Mutex<HashMap<String, PendingAuthorization>>>,
}

impl OAuthStrategy {
    /// Build a strategy from provider endpoints and client credentials
    ///
    /// The HTTP client carries the handshake timeout and disables redirect
    /// following, so a stalled provider surfaces as `Provider` instead of
    /// hanging the pipeline.
    pub fn new(
        provider: Provider,
        endpoints: OAuthEndpoints,
        client_id: String,
        client_secret: String,
        redirect_uri: String,
        handshake_timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::ClientBuilder::new()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(handshake_timeout)
            .build()
            .map_err(|e| GatewayError::internal(format!("http client construction failed: {e}")))?;

        Ok(Self {
            provider,
            client_id: ClientId::new(client_id),
            client_secret: ClientSecret::new(client_secret),
            auth_url: AuthUrl::new(endpoints.auth_url)
                .map_err(|e| GatewayError::internal(format!("invalid auth url: {e}")))?,
            token_url: TokenUrl::new(endpoints.token_url)
                .map_err(|e| GatewayError::internal(format!("invalid token url: {e}")))?,
            redirect_url: RedirectUrl::new(redirect_uri)
                .map_err(|e| GatewayError::internal(format!("invalid redirect uri: {e}")))?,
            userinfo_url: endpoints.userinfo_url,
            scopes: endpoints.scopes.into_iter().map(Scope::new).collect(),
            http,
            pending: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    fn create_client(&self) -> ConfiguredClient {
        BasicClient::new(self.client_id.clone())
            .set_client_secret(self.client_secret.clone())
            .set_auth_uri(self.auth_url.clone())
            .set_token_uri(self.token_url.clone())
            .set_redirect_uri(self.redirect_url.clone())
    }

    /// Read `code` and `state` out of the callback query string
    pub fn extract_credentials(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<Credentials, GatewayError> {
        let field = |name: &str| {
            query
                .get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    GatewayError::missing_credentials(format!("callback is missing {name}"))
                })
        };

        Ok(Credentials::AuthorizationCode {
            code: field("code")?,
            state: field("state")?,
        })
    }

    /// First round trip: build the consent URL and remember the flow
    pub fn begin(&self) -> Result<String, GatewayError> {
        let client = self.create_client();
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut request = client.authorize_url(CsrfToken::new_random);
        for scope in &self.scopes {
            request = request.add_scope(scope.clone());
        }
        let (auth_url, csrf_state) = request.set_pkce_challenge(pkce_challenge).url();

        let mut pending = self.pending.lock().unwrap();
        pending.retain(|_, flow| !flow.is_expired());
        pending.insert(
            csrf_state.secret().clone(),
            PendingAuthorization {
                pkce_verifier: pkce_verifier.secret().clone(),
                issued_at: Utc::now(),
            },
        );

        tracing::debug!(provider = %self.provider, "authorization flow started");
        Ok(auth_url.to_string())
    }

    /// Consume the pending flow matching a callback state
    ///
    /// Removal and validation happen in one step, so a replayed state fails
    /// on the second presentation.
    fn take_pending(&self, state: &str) -> Option<String> {
        let mut pending = self.pending.lock().unwrap();
        let flow = pending.remove(state)?;
        if flow.is_expired() {
            return None;
        }
        Some(flow.pkce_verifier)
    }

    /// Second round trip: exchange the code, fetch the profile, resolve the
    /// identity
    ///
    /// # Errors
    ///
    /// * `InvalidCredentials` - unknown, expired, or replayed state
    /// * `Provider` - exchange or profile fetch failed or timed out
    pub async fn finish(
        &self,
        code: &str,
        state: &str,
        identities: &IdentityStore,
    ) -> Result<Identity, GatewayError> {
        let pkce_verifier = self.take_pending(state).ok_or_else(|| {
            tracing::warn!(provider = %self.provider, "callback with unknown or expired state");
            GatewayError::InvalidCredentials
        })?;

        let token = self
            .create_client()
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier))
            .request_async(&self.http)
            .await
            .map_err(|e| GatewayError::provider(format!("token exchange failed: {e}")))?;

        let profile: serde_json::Value = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| GatewayError::provider(format!("profile fetch failed: {e}")))?
            .error_for_status()
            .map_err(|e| GatewayError::provider(format!("profile fetch rejected: {e}")))?
            .json()
            .await
            .map_err(|e| GatewayError::provider(format!("profile response malformed: {e}")))?;

        let account_id = profile
            .get("id")
            .map(|id| match id {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GatewayError::provider("profile has no account id"))?;

        let mut attributes = HashMap::new();
        for key in ["name", "email", "picture"] {
            if let Some(value) = profile.get(key).and_then(|v| v.as_str()) {
                attributes.insert(key.to_string(), value.to_string());
            }
        }

        Ok(identities
            .find_or_create(self.provider, &account_id, attributes)
            .await)
    }
}
