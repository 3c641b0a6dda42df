/**
 * Server Configuration
 *
 * Configuration comes from environment variables with sensible defaults for
 * local development. Unparsable values are logged and replaced by their
 * default; a missing OAuth credential pair simply leaves that provider
 * unregistered. Configuration problems never prevent startup.
 */

use std::path::PathBuf;

/// Client credentials for one OAuth provider
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port (`PORT`)
    pub port: u16,
    /// Allowed CORS origin, where the frontend runs (`FRONTEND_ORIGIN`)
    pub cors_origin: String,
    /// Session cookie name (`SESSION_COOKIE`)
    pub cookie_name: String,
    /// Session lifetime in seconds (`SESSION_TTL_SECS`)
    pub session_ttl_secs: i64,
    /// Request body size limit in bytes (`BODY_LIMIT_BYTES`)
    pub body_limit_bytes: usize,
    /// Directory uploads are stored in (`UPLOAD_DIR`)
    pub upload_dir: PathBuf,
    /// Per-file upload size cap in bytes (`MAX_UPLOAD_BYTES`)
    pub max_upload_bytes: u64,
    /// Where a completed OAuth login lands (`POST_LOGIN_REDIRECT`)
    pub login_redirect: String,
    /// Where a failed OAuth callback lands (`AUTH_FAILURE_REDIRECT`)
    pub failure_redirect: String,
    /// Outbound provider handshake timeout in seconds (`PROVIDER_TIMEOUT_SECS`)
    pub provider_timeout_secs: u64,
    /// Google OAuth credentials (`GOOGLE_CLIENT_ID`/`GOOGLE_CLIENT_SECRET`)
    pub google: Option<OAuthCredentials>,
    /// Facebook OAuth credentials (`FACEBOOK_CLIENT_ID`/`FACEBOOK_CLIENT_SECRET`)
    pub facebook: Option<OAuthCredentials>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_origin: "http://localhost:5173".to_string(),
            cookie_name: "gate_session".to_string(),
            session_ttl_secs: 86_400,
            body_limit_bytes: 50 * 1024 * 1024,
            upload_dir: PathBuf::from("./uploads"),
            max_upload_bytes: 25 * 1024 * 1024,
            login_redirect: "/".to_string(),
            failure_redirect: "/?auth=failure".to_string(),
            provider_timeout_secs: 10,
            google: None,
            facebook: None,
        }
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "unparsable value, using default");
            default
        }),
        Err(_) => default,
    }
}

/// Read one provider's credential pair from the environment
///
/// Returns `None` unless both the id and the secret are set.
fn env_oauth(prefix: &str, default_redirect: String) -> Option<OAuthCredentials> {
    let client_id = std::env::var(format!("{prefix}_CLIENT_ID")).ok()?;
    let client_secret = std::env::var(format!("{prefix}_CLIENT_SECRET")).ok()?;
    let redirect_uri =
        std::env::var(format!("{prefix}_REDIRECT_URI")).unwrap_or(default_redirect);

    Some(OAuthCredentials {
        client_id,
        client_secret,
        redirect_uri,
    })
}

impl ServerConfig {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let port = env_parsed("PORT", defaults.port);

        let google = env_oauth(
            "GOOGLE",
            format!("http://localhost:{port}/auth/google/callback"),
        );
        let facebook = env_oauth(
            "FACEBOOK",
            format!("http://localhost:{port}/auth/facebook/callback"),
        );

        if google.is_none() {
            tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, google login disabled");
        }
        if facebook.is_none() {
            tracing::warn!(
                "FACEBOOK_CLIENT_ID/FACEBOOK_CLIENT_SECRET not set, facebook login disabled"
            );
        }

        Self {
            port,
            cors_origin: env_string("FRONTEND_ORIGIN", &defaults.cors_origin),
            cookie_name: env_string("SESSION_COOKIE", &defaults.cookie_name),
            session_ttl_secs: env_parsed("SESSION_TTL_SECS", defaults.session_ttl_secs),
            body_limit_bytes: env_parsed("BODY_LIMIT_BYTES", defaults.body_limit_bytes),
            upload_dir: PathBuf::from(env_string("UPLOAD_DIR", "./uploads")),
            max_upload_bytes: env_parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes),
            login_redirect: env_string("POST_LOGIN_REDIRECT", &defaults.login_redirect),
            failure_redirect: env_string("AUTH_FAILURE_REDIRECT", &defaults.failure_redirect),
            provider_timeout_secs: env_parsed(
                "PROVIDER_TIMEOUT_SECS",
                defaults.provider_timeout_secs,
            ),
            google,
            facebook,
        }
    }
}
