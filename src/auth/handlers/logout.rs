/**
 * Logout Handler
 *
 * Destroys the current session and clears the cookie. Logging out without
 * a live session still succeeds and still clears the cookie.
 */

use axum::{
    extract::{Request, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};

use crate::auth::handlers::clear_session_cookie;
use crate::error::GatewayError;
use crate::middleware::session::CurrentIdentity;
use crate::server::state::AppState;

/// `POST /auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, GatewayError> {
    if let Some(current) = request.extensions().get::<CurrentIdentity>() {
        state.sessions.destroy(&current.session_token).await;
        tracing::info!(identity = %current.identity.id, "logged out");
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie(&state.config))],
        Json(serde_json::json!({ "ok": true })),
    ))
}
