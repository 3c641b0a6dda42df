/**
 * Strategy-Generic Authentication Flow
 *
 * Two handlers cover every registered strategy. The pipeline never
 * branches on provider names: a strategy that completes in one round trip
 * (local) verifies right here; a strategy that needs a callback (OAuth)
 * answers the first request with a redirect to the provider and finishes
 * in `finish_auth`.
 */

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Json, Redirect, Response},
};

use crate::auth::handlers::{session_cookie, types::SessionResponse};
use crate::error::GatewayError;
use crate::server::state::AppState;

/// Parse an optional JSON request body
///
/// An empty body is fine (OAuth entry requests have none); a present but
/// malformed body short-circuits the pipeline.
fn parse_body(body: &Bytes) -> Result<Option<serde_json::Value>, GatewayError> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| GatewayError::invalid_request(format!("malformed JSON body: {e}")))
}

/// `GET|POST /auth/{provider}` — initiate a strategy
pub async fn begin_auth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let strategy = state.strategies.resolve(&provider)?;

    if strategy.requires_callback() {
        // round trip 1 of 2: send the client to the provider's consent flow
        let consent_url = strategy.authorize_redirect()?;
        return Ok(Redirect::to(&consent_url).into_response());
    }

    // single round trip: credentials travel in this request
    let body = parse_body(&body)?;
    let credentials = strategy.extract_credentials(body.as_ref(), &query)?;
    let identity = strategy.verify(credentials, &state.identities).await?;
    let session = state.sessions.create(identity.id).await;

    tracing::info!(%provider, identity = %identity.id, "authentication succeeded");

    Ok((
        [(SET_COOKIE, session_cookie(&state.config, &session.token))],
        Json(SessionResponse {
            user: identity.into(),
        }),
    )
        .into_response())
}

/// `GET /auth/{provider}/callback` — complete a redirect strategy
///
/// On success the session cookie is set and the client lands on the
/// configured post-login location; a failed handshake redirects to the
/// failure location instead of surfacing provider detail.
pub async fn finish_auth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Response, GatewayError> {
    let strategy = state.strategies.resolve(&provider)?;

    if !strategy.requires_callback() {
        return Err(GatewayError::not_found(format!(
            "strategy {provider} does not complete over a callback"
        )));
    }

    let verified = match strategy.extract_credentials(None, &query) {
        Ok(credentials) => strategy.verify(credentials, &state.identities).await,
        Err(e) => Err(e),
    };

    match verified {
        Ok(identity) => {
            let session = state.sessions.create(identity.id).await;
            tracing::info!(%provider, identity = %identity.id, "callback authentication succeeded");
            Ok((
                [(SET_COOKIE, session_cookie(&state.config, &session.token))],
                Redirect::to(&state.config.login_redirect),
            )
                .into_response())
        }
        Err(e) => {
            tracing::warn!(%provider, error = %e, "callback authentication failed");
            Ok(Redirect::to(&state.config.failure_redirect).into_response())
        }
    }
}
