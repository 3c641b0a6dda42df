/**
 * Access Guard
 *
 * The authorization checkpoint in front of protected routes. Runs strictly
 * after session resolution and requires an attached identity. Every denial
 * cause (no session, expired session, dangling identity) collapses to one
 * Unauthorized signal for the client; the logs keep the distinction.
 */

use axum::{
    extract::{FromRequestParts, Request},
    middleware::Next,
    response::Response,
};

use crate::auth::identity::Identity;
use crate::error::GatewayError;
use crate::middleware::session::CurrentIdentity;
use crate::server::state::AppState;

/// Require an attached identity before the handler runs
pub async fn require_identity(request: Request, next: Next) -> Result<Response, GatewayError> {
    if request.extensions().get::<CurrentIdentity>().is_none() {
        tracing::warn!(path = %request.uri().path(), "denying request without an attached identity");
        return Err(GatewayError::Unauthorized);
    }
    Ok(next.run(request).await)
}

/// Extractor for the identity the guard admitted
///
/// Handlers behind the guard take `AuthIdentity` as a parameter instead of
/// reading request extensions by hand.
#[derive(Clone, Debug)]
pub struct AuthIdentity(pub Identity);

impl FromRequestParts<AppState> for AuthIdentity {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = parts
            .extensions
            .get::<CurrentIdentity>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("handler reached without an attached identity");
                GatewayError::Unauthorized
            })?;

        Ok(AuthIdentity(current.identity))
    }
}
