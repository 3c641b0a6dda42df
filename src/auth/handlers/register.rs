/**
 * Local Registration Handler
 *
 * Creates a local identity and logs it straight in. This is the seed
 * surface for the local strategy, not a users-CRUD API.
 */

use axum::{
    body::Bytes,
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};

use crate::auth::handlers::{
    session_cookie,
    types::{RegisterRequest, SessionResponse},
};
use crate::error::GatewayError;
use crate::server::state::AppState;

/// `POST /auth/local/register`
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let request: RegisterRequest = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::invalid_request(format!("malformed JSON body: {e}")))?;

    let identity = state
        .identities
        .register_local(
            &request.username,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    let session = state.sessions.create(identity.id).await;

    Ok((
        [(SET_COOKIE, session_cookie(&state.config, &session.token))],
        Json(SessionResponse {
            user: identity.into(),
        }),
    ))
}
