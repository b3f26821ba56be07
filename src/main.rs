use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use rulecheck::config::{self, Config};
use rulecheck::pipeline::check::GeminiClient;
use rulecheck::server::{build_router, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let client = Arc::new(GeminiClient::new(&config));
    let model = client.model().to_string();
    let state = Arc::new(AppState::new(client, config.max_concurrent_checks));
    let app = build_router(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(addr = %config.bind_addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(
        addr = %config.bind_addr,
        model = %model,
        max_concurrent = config.max_concurrent_checks,
        "server started"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
