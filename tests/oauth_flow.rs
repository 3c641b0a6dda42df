//! OAuth strategy integration tests
//!
//! The consent redirect and the failure paths run against the real Google
//! endpoint configuration (nothing leaves the process before the exchange).
//! The full two-round-trip handshake runs against a mock provider listening
//! on a loopback port, so the code exchange and profile fetch are exercised
//! for real.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use authgate::auth::identity::{IdentityStore, Provider};
use authgate::auth::sessions::SessionStore;
use authgate::auth::strategy::{
    LocalStrategy, OAuthEndpoints, OAuthStrategy, Strategy, StrategyRegistry,
};
use authgate::files::storage::FileStorage;
use authgate::server::config::{OAuthCredentials, ServerConfig};
use authgate::server::state::AppState;
use common::{query_param, server_for};

/// Server with google registered against the real endpoint set
async fn server_with_google() -> (TempDir, TestServer) {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        upload_dir: dir.path().to_path_buf(),
        google: Some(OAuthCredentials {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_uri: "http://localhost:8080/auth/google/callback".to_string(),
        }),
        ..ServerConfig::default()
    };
    let state = authgate::server::build_state(config).await.unwrap();
    (dir, server_for(state))
}

/// Start a loopback identity provider and return its base URL
async fn spawn_mock_provider() -> String {
    async fn token() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "access_token": "mock-access-token",
            "token_type": "bearer",
            "expires_in": 3600,
        }))
    }

    async fn userinfo() -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "id": "mock-account-1",
            "name": "Mock User",
            "email": "mock@example.com",
        }))
    }

    let app = Router::new()
        .route("/token", post(token))
        .route("/userinfo", get(userinfo));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

/// Server whose google strategy talks to the mock provider
async fn server_with_mock_provider() -> (TempDir, TestServer) {
    let base = spawn_mock_provider().await;
    let endpoints = OAuthEndpoints {
        auth_url: format!("{base}/authorize"),
        token_url: format!("{base}/token"),
        userinfo_url: format!("{base}/userinfo"),
        scopes: vec!["email".to_string()],
    };

    let strategy = OAuthStrategy::new(
        Provider::Google,
        endpoints,
        "test-client-id".to_string(),
        "test-client-secret".to_string(),
        "http://localhost:8080/auth/google/callback".to_string(),
        std::time::Duration::from_secs(5),
    )
    .unwrap();

    let mut strategies = StrategyRegistry::new();
    strategies.register("local", Strategy::Local(LocalStrategy));
    strategies.register("google", Strategy::OAuth(strategy));

    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        upload_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let storage = FileStorage::new(config.upload_dir.clone(), config.max_upload_bytes)
        .await
        .unwrap();
    let sessions = SessionStore::new(chrono::Duration::seconds(config.session_ttl_secs));

    let state = AppState {
        config: Arc::new(config),
        identities: IdentityStore::new(),
        sessions,
        strategies: Arc::new(strategies),
        storage,
    };

    (dir, server_for(state))
}

/// Run round trip 1 and return the state parameter from the consent URL
async fn start_flow(server: &TestServer) -> String {
    let response = server.get("/auth/google").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let location = response.header(axum::http::header::LOCATION);
    query_param(location.to_str().unwrap(), "state").unwrap()
}

#[tokio::test]
async fn test_entry_redirects_to_consent_url() {
    let (_dir, server) = server_with_google().await;

    let response = server.get("/auth/google").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let location = response.header(axum::http::header::LOCATION);
    let location = location.to_str().unwrap();
    assert!(location.starts_with("https://accounts.google.com/o/oauth2/v2/auth"));
    assert!(location.contains("client_id=test-client-id"));
    assert!(query_param(location, "state").is_some());
}

#[tokio::test]
async fn test_callback_with_unknown_state_redirects_to_failure() {
    let (_dir, server) = server_with_google().await;

    let response = server
        .get("/auth/google/callback?code=some-code&state=never-issued")
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let location = response.header(axum::http::header::LOCATION);
    assert_eq!(location.to_str().unwrap(), "/?auth=failure");
}

#[tokio::test]
async fn test_callback_missing_parameters_redirects_to_failure() {
    let (_dir, server) = server_with_google().await;

    let response = server.get("/auth/google/callback").await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let location = response.header(axum::http::header::LOCATION);
    assert_eq!(location.to_str().unwrap(), "/?auth=failure");
}

#[tokio::test]
async fn test_callback_on_local_strategy_is_not_found() {
    let (_dir, server) = server_with_google().await;
    let response = server.get("/auth/local/callback?code=x&state=y").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_handshake_against_mock_provider() {
    let (_dir, server) = server_with_mock_provider().await;

    let state = start_flow(&server).await;

    let response = server
        .get(&format!("/auth/google/callback?code=mock-code&state={state}"))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let location = response.header(axum::http::header::LOCATION);
    assert_eq!(location.to_str().unwrap(), "/");

    // the session cookie from the callback unlocks protected routes
    let profile = server.get("/protected/profile").await;
    assert_eq!(profile.status_code(), StatusCode::OK);

    let body: serde_json::Value = profile.json();
    assert_eq!(body["provider"], "google");
    assert_eq!(body["account"], "mock-account-1");
    assert_eq!(body["display"]["email"], "mock@example.com");
}

#[tokio::test]
async fn test_repeat_login_reuses_the_identity() {
    let (_dir, server) = server_with_mock_provider().await;

    let state = start_flow(&server).await;
    server
        .get(&format!("/auth/google/callback?code=code-1&state={state}"))
        .await;
    let first: serde_json::Value = server.get("/protected/profile").await.json();

    // a second consent flow for the same provider account
    let state = start_flow(&server).await;
    server
        .get(&format!("/auth/google/callback?code=code-2&state={state}"))
        .await;
    let second: serde_json::Value = server.get("/protected/profile").await.json();

    // same identity, no duplicate for the {provider, account} pair
    assert_eq!(first["id"], second["id"]);
}

#[tokio::test]
async fn test_state_replay_fails_the_second_time() {
    let (_dir, server) = server_with_mock_provider().await;

    let state = start_flow(&server).await;

    let first = server
        .get(&format!("/auth/google/callback?code=code-1&state={state}"))
        .await;
    assert_eq!(first.header(axum::http::header::LOCATION).to_str().unwrap(), "/");

    // the consumed state must not complete a second flow
    let replay = server
        .get(&format!("/auth/google/callback?code=code-3&state={state}"))
        .await;
    assert_eq!(replay.header(axum::http::header::LOCATION).to_str().unwrap(), "/?auth=failure");
}
