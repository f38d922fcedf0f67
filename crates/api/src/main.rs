use anyhow::Context;

use corporativo_api::app::{build_app, services};
use corporativo_infra::config::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    corporativo_observability::init();

    let settings = Settings::from_env().context("invalid configuration")?;
    let services = services::build_services(&settings)
        .await
        .context("failed to open record store")?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
