use anyhow::Context;

use commissionhub_api::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("pretty") => commissionhub_observability::tracing::init_pretty(),
        _ => commissionhub_observability::init(),
    }

    let config = GatewayConfig::from_env().context("invalid gateway configuration")?;
    let bind_addr = config.bind_addr;

    let app = commissionhub_api::app::build_app(config);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
