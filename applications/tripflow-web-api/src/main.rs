use tracing::info;
use tracing_subscriber::EnvFilter;

use tripflow_web_api::api;
use tripflow_web_api::auth::AuthState;
use tripflow_web_api::config::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting tripflow-web-api");

    let cfg = Config::load()?;
    info!(backend = %cfg.backend.base_url, "Configuration loaded");

    let state = AuthState::new(cfg.clone())?;
    let router = api::create_router(state);
    let addr = cfg.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("Web API listening on {}", addr);

    let serve = axum::serve(listener, router);
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Shutdown signal received");
    };

    if let Err(e) = serve.with_graceful_shutdown(shutdown).await {
        tracing::error!(error = %e, "server error");
    }

    info!("Application shutdown complete");
    Ok(())
}
