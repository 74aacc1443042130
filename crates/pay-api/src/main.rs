//! # PayPal PWA Gateway
//!
//! Sales-channel API endpoints for PayPal Smart Payment Buttons in
//! headless storefronts.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export CHECKOUT_UPSTREAM_URL=https://shop.example.com
//! export CHANNELS_CONFIG=config/channels.toml
//!
//! # Run the server
//! paypal-pwa-gateway
//! ```

use pay_api::{
    routes,
    state::{AppConfig, AppState, LogFormat},
};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_logging(config.log_format);

    print_banner();

    // Initialize application state
    let state = AppState::with_config(config)?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Checkout delegate: {}", state.checkout.delegate_name());
    for alias in routes::sales_channel_routes().aliases() {
        info!("Route alias: {} -> {}", alias.alias, alias.canonical);
    }

    let _purge = state.spawn_approval_purge();

    // Create router
    let app = routes::create_router(state);

    info!("PayPal PWA gateway starting on http://{}", addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!(
            "Client id: POST http://{}/sales-channel-api/v1/pwa/plugin/paypal/client-id",
            addr
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

fn print_banner() {
    println!(
        r#"
  PayPal PWA Gateway
  ━━━━━━━━━━━━━━━━━━
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
