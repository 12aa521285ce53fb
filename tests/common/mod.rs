//! Shared helpers for integration tests: an in-process app backed by
//! in-memory SQLite and the memory object store, plus a mock OAuth2
//! provider served on a random local port.

use axum::response::IntoResponse;
use axum::{Json, Router};
use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::Key;
use minblog::auth::GoogleProvider;
use minblog::auth::session::{self, SessionData};
use minblog::config::OAuthConfig;
use minblog::database::Database;
use minblog::storage::{MemoryObjectStore, ObjectStore};
use minblog::{AppState, router, templates};
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryObjectStore>,
}

/// Build a test app against the given OAuth configuration.
pub async fn test_app_with_oauth(oauth: OAuthConfig) -> TestApp {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    let db = Database::from_pool(pool.clone());
    db.init_schema().await.expect("schema init");

    let store = Arc::new(MemoryObjectStore::new());
    let state = AppState {
        db: pool,
        store: store.clone() as Arc<dyn ObjectStore>,
        oauth: Arc::new(GoogleProvider::new(oauth).expect("provider")),
        templates: Arc::new(templates::build_templates().expect("templates")),
        cookie_key: Key::generate(),
    };

    TestApp {
        router: router(state.clone()),
        state,
        store,
    }
}

/// Build a test app whose provider points at unresolvable defaults. Fine
/// for tests that never reach the token exchange.
pub async fn test_app() -> TestApp {
    test_app_with_oauth(test_oauth_config(None)).await
}

/// OAuth config for tests; `base_url` points the provider endpoints at a
/// mock server.
pub fn test_oauth_config(base_url: Option<&str>) -> OAuthConfig {
    OAuthConfig {
        client_id: "test-client-id".to_string(),
        client_secret: "test-client-secret".to_string(),
        redirect_url: "http://localhost:8080/auth/callback".to_string(),
        scopes: vec![
            "https://www.googleapis.com/auth/userinfo.profile".to_string(),
            "https://www.googleapis.com/auth/userinfo.email".to_string(),
        ],
        auth_url: base_url.map(|b| format!("{b}/authorize")),
        token_url: base_url.map(|b| format!("{b}/token")),
        userinfo_url: base_url.map(|b| format!("{b}/userinfo")),
    }
}

/// `Cookie` header value carrying an authenticated session, encrypted with
/// the app's own key.
pub fn auth_cookie(state: &AppState) -> String {
    let jar = PrivateCookieJar::new(state.cookie_key.clone());
    let jar = session::write_session(jar, &SessionData { authenticated: true });
    let response = (jar, "").into_response();
    let set_cookie = response
        .headers()
        .get(axum::http::header::SET_COOKIE)
        .expect("session set-cookie")
        .to_str()
        .expect("cookie is ascii");
    set_cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

/// Mock OAuth2 provider with hit counters for the token and userinfo
/// endpoints.
pub struct MockProvider {
    pub base_url: String,
    pub token_hits: Arc<AtomicUsize>,
    pub userinfo_hits: Arc<AtomicUsize>,
}

pub async fn spawn_mock_provider() -> MockProvider {
    let token_hits = Arc::new(AtomicUsize::new(0));
    let userinfo_hits = Arc::new(AtomicUsize::new(0));

    let token_counter = token_hits.clone();
    let userinfo_counter = userinfo_hits.clone();

    let app = Router::new()
        .route(
            "/token",
            axum::routing::post(move || async move {
                token_counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "access_token": "test-access-token",
                    "token_type": "Bearer",
                    "expires_in": 3600,
                }))
            }),
        )
        .route(
            "/userinfo",
            axum::routing::get(move || async move {
                userinfo_counter.fetch_add(1, Ordering::SeqCst);
                Json(json!({
                    "sub": "1234567890",
                    "email": "user@example.com",
                    "email_verified": true,
                    "name": "Test User",
                }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock provider");
    });

    MockProvider {
        base_url: format!("http://{addr}"),
        token_hits,
        userinfo_hits,
    }
}
