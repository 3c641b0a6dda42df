/**
 * Session Resolution Middleware
 *
 * Runs on every request before route dispatch: reads the session cookie,
 * resolves the token through the session store, resolves the referenced
 * identity, and attaches it to the request extensions. Requests without a
 * resolvable identity pass through unauthenticated; denial is the Access
 * Guard's job.
 */

use axum::{
    extract::{Request, State},
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::identity::Identity;
use crate::server::state::AppState;

/// Identity attached to a request by session resolution
#[derive(Clone, Debug)]
pub struct CurrentIdentity {
    pub identity: Identity,
    /// Token of the session that established the identity
    pub session_token: String,
}

/// Read a cookie value out of the request headers
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(COOKIE).iter().find_map(|header| {
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    })
}

/// Session attach stage
///
/// The invariant this stage upholds: a request carries a `CurrentIdentity`
/// only if an unexpired session resolves to a live identity. A session whose
/// identity is gone is destroyed on sight.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = cookie_value(request.headers(), &state.config.cookie_name);

    if let Some(token) = token {
        match state.sessions.get(&token).await {
            Some(session) => match state.identities.get(session.identity_id).await {
                Some(identity) => {
                    request.extensions_mut().insert(CurrentIdentity {
                        identity,
                        session_token: token,
                    });
                }
                None => {
                    // dangling identity reference: the session is invalid
                    tracing::warn!(identity = %session.identity_id,
                        "session references a missing identity, destroying it");
                    state.sessions.destroy(&token).await;
                }
            },
            None => {
                tracing::debug!("presented session token is unknown or expired");
            }
        }
    }

    next.run(request).await
}
