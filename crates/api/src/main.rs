use anyhow::Context;

use salesdesk_infra::AppConfig;
use salesdesk_observability::TracingOptions;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    salesdesk_observability::init_with(&TracingOptions {
        json: config.log.json,
        default_filter: config.log.filter.clone(),
    });

    if config.uses_default_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let app = salesdesk_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
