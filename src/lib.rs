//! A small blog server: pages and post metadata out of SQLite, post bodies
//! out of an S3-compatible object store, post creation gated behind a
//! Google-login cookie session.

use anyhow::{Context, Result, bail};
use axum::extract::FromRef;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use axum_extra::extract::cookie::Key;
use handlebars::Handlebars;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod posts;
pub mod storage;
pub mod templates;

use auth::GoogleProvider;
use config::Config;
use storage::{ObjectStore, S3ObjectStore};

/// Shared application state. Built once at startup; every field is safe for
/// concurrent use and never reconfigured afterwards.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub store: Arc<dyn ObjectStore>,
    pub oauth: Arc<GoogleProvider>,
    pub templates: Arc<Handlebars<'static>>,
    pub cookie_key: Key,
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Assemble the router. Only the create POST goes through the auth gate;
/// the create form stays public.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/about", get(handlers::about))
        .route("/post", get(handlers::view_post))
        .route(
            "/create",
            post(handlers::create_post)
                .route_layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth::middleware::require_auth,
                ))
                .get(handlers::create_form),
        )
        .route("/auth/login", get(auth::routes::login))
        .route("/auth/callback", get(auth::routes::callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Build application state from configuration. Any failure here is a fatal
/// startup error.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let db = database::init_database(&config.database_url).await?;

    let store = S3ObjectStore::new(&config.object_store)
        .context("Failed to construct object store client")?;

    let oauth = GoogleProvider::new(config.oauth.clone())
        .context("Failed to construct OAuth2 provider")?;

    let templates = templates::build_templates().context("Failed to register templates")?;

    let cookie_key = match &config.cookie_secret {
        Some(secret) if secret.len() >= 64 => Key::from(secret.as_bytes()),
        Some(_) => bail!("cookie secret must be at least 64 bytes"),
        None => Key::generate(),
    };

    Ok(AppState {
        db: db.pool().clone(),
        store: Arc::new(store),
        oauth: Arc::new(oauth),
        templates: Arc::new(templates),
        cookie_key,
    })
}

/// Start the server and return the bound port. The server runs until the
/// shutdown signal fires.
pub async fn start_server_with_config(
    config: Config,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> Result<u16> {
    let state = build_state(&config).await?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(config.server_addr())
        .await
        .with_context(|| format!("Failed to bind {}", config.server_addr()))?;
    let port = listener.local_addr()?.port();

    info!("listening on {}:{}", config.host, port);

    tokio::spawn(async move {
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            shutdown_rx.await.ok();
        });
        if let Err(e) = server.await {
            error!("server error: {}", e);
        }
    });

    Ok(port)
}

pub async fn start_server(shutdown_rx: tokio::sync::oneshot::Receiver<()>) -> Result<u16> {
    start_server_with_config(Config::from_env()?, shutdown_rx).await
}
