use anyhow::Context;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use intake_server::config::ENV_CONFIG;
use intake_server::{router, AppConfig, AppState, Pipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // INTAKE_LOG uses RUST_LOG syntax, e.g. "info,intake_pdf=debug"
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INTAKE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::var_os(ENV_CONFIG).map(PathBuf::from);
    let mut config = AppConfig::load(config_path.as_deref()).context("loading configuration")?;
    config.apply_env_overrides()?;

    if let Some(dir) = &config.upload_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating upload dir {}", dir))?;
    }

    let pipeline = Pipeline::from_config(&config)?;
    let app = router(AppState::new(pipeline, &config), config.max_upload_bytes);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    log::info!("[Server] listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
