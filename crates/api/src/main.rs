use anyhow::Context;

use storefront_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = ApiConfig::from_env();
    let app = storefront_api::app::build_app(config.catalog.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        base_url = config.catalog.seo.base_url(),
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
