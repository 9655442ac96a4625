use std::sync::Arc;

use anyhow::Context;

use microcommerce_api::app::{self, services::AppServices};
use microcommerce_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    microcommerce_observability::init(&config.logging);

    let services = Arc::new(AppServices::from_config(&config).await?);
    let app = app::build_app(services);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
