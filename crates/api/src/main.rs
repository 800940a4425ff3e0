use anyhow::Context;

use batchadmin_api::{AdminConfig, app};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    batchadmin_observability::init();

    let config = AdminConfig::from_env().context("invalid configuration")?;
    let store = app::build_store(&config).context("failed to initialise execution store")?;
    let router = app::build_app(&config, store);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        time_zone = %config.time_zone,
        page_size = config.page_size,
        "listening"
    );

    axum::serve(listener, router).await?;
    Ok(())
}
