use assistant_core::Config;
use std::sync::Arc;
use tooling::{validate_startup, ToolContext};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting assistant tool server");

    let config = Config::load_from_env()
        .unwrap_or_else(|e| {
            warn!("Could not load config ({}), using development defaults", e);
            Config::development()
        })
        .with_env_overrides();

    let context = Arc::new(ToolContext::from_config(&config).await?);

    let available = match validate_startup(&context).await {
        Ok(available) => available,
        Err(e) => {
            error!("Tool validation failed, refusing to start: {}", e);
            return Err(e.into());
        }
    };
    info!("{} tools available", available.len());

    let app = server::create_app(context);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server running on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}
