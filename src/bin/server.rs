use minblog::config::Config;
use minblog::start_server_with_config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Missing credentials, an unreachable database, or a bad object-store
    // endpoint all abort startup with a non-zero exit.
    let config = Config::from_env()?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let port = start_server_with_config(config, shutdown_rx).await?;
    info!("blog server started on port {}", port);

    tokio::signal::ctrl_c().await?;
    info!("shutdown requested, stopping server...");
    let _ = shutdown_tx.send(());

    Ok(())
}
