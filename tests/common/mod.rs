//! Shared helpers for integration tests
//!
//! Builds a real gateway (in-memory stores, temp upload directory) and
//! wraps it in an `axum_test::TestServer` with cookie saving enabled, so
//! suites drive the same pipeline the binary serves.

use axum_test::TestServer;
use tempfile::TempDir;

use authgate::routes::create_router;
use authgate::server::{build_state, AppState, ServerConfig};

/// Configuration pointing the upload directory at a temp dir
pub fn test_config(dir: &TempDir) -> ServerConfig {
    ServerConfig {
        upload_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    }
}

/// Build gateway state over a temp upload directory
pub async fn test_state() -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let state = build_state(config).await.unwrap();
    (dir, state)
}

/// A test server over freshly built state
pub async fn test_server() -> (TempDir, TestServer) {
    let (dir, state) = test_state().await;
    (dir, server_for(state))
}

/// Wrap existing state in a cookie-saving test server
pub fn server_for(state: AppState) -> TestServer {
    let mut server = TestServer::new(create_router(state)).unwrap();
    server.do_save_cookies();
    server
}

/// Register a local account and leave its session cookie in the jar
pub async fn register_user(server: &TestServer, username: &str, password: &str) -> String {
    let response = server
        .post("/auth/local/register")
        .json(&serde_json::json!({
            "username": username,
            "password": password,
        }))
        .await;
    assert_eq!(response.status_code(), axum::http::StatusCode::OK);

    let body: serde_json::Value = response.json();
    body["user"]["id"].as_str().unwrap().to_string()
}

/// Pull a query parameter out of a redirect location
pub fn query_param(url: &str, key: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| v.to_string())
    })
}
