/**
 * Router Configuration
 *
 * Assembles the pipeline around the route table. Stage order is the
 * contract here:
 *
 * 1. CORS and the request body limit (outermost)
 * 2. Session resolution — attaches the identity, never denies
 * 3. Route dispatch
 * 4. Access Guard — protected subtree only, strictly after session
 *    resolution
 * 5. Handler
 * 6. Error normalization via `IntoResponse for GatewayError`, including the
 *    404 fallback for unmatched routes
 */

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::auth::handlers::{begin_auth, finish_auth, logout, profile, register};
use crate::error::GatewayError;
use crate::files::handlers::{download_file, upload_file};
use crate::middleware::guard::require_identity;
use crate::middleware::session::session_middleware;
use crate::server::state::AppState;

/// Create the router with all routes and pipeline stages configured
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.body_limit_bytes);

    // routes behind the Access Guard
    let protected = Router::new()
        .route("/protected/profile", get(profile))
        .route("/files/upload/{user_id}", post(upload_file))
        .route("/download/{reference}", get(download_file))
        .layer(axum::middleware::from_fn(require_identity));

    Router::new()
        .route("/", get(home))
        .route("/auth/local/register", post(register))
        .route("/auth/logout", post(logout))
        .route("/auth/{provider}", get(begin_auth).post(begin_auth))
        .route("/auth/{provider}/callback", get(finish_auth))
        .merge(protected)
        .fallback(fallback)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ))
        .layer(body_limit)
        .layer(cors)
        .with_state(state)
}

/// Home route, an external collaborator as far as the pipeline is concerned
async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "authgate",
        "status": "ok",
    }))
}

/// Unmatched routes terminate in the error normalizer like any other failure
async fn fallback() -> GatewayError {
    GatewayError::not_found("route is not defined")
}

fn cors_layer(config: &crate::server::config::ServerConfig) -> CorsLayer {
    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => {
            tracing::warn!(origin = %config.cors_origin, "invalid CORS origin, leaving CORS unconfigured");
            CorsLayer::new()
        }
    }
}
