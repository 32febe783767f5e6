//! `acme-mock` — mock ACME server binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise structured JSON logging.
//! 3. Load the TLS certificate and private key, build the rustls config.
//! 4. Build the Axum router around an empty [`OrderStore`].
//! 5. Start the TLS accept loop.

mod config;
mod order;
mod server;
mod telemetry;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::order::OrderStore;
use crate::server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init(&cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        tls_port = cfg.tls_port,
        "acme-mock starting"
    );

    // -----------------------------------------------------------------------
    // 3. TLS identity
    // -----------------------------------------------------------------------
    let cert_pem = tokio::fs::read(&cfg.tls_cert_path)
        .await
        .with_context(|| format!("failed to read TLS certificate from {}", cfg.tls_cert_path))?;
    let key_pem = tokio::fs::read(&cfg.tls_key_path)
        .await
        .with_context(|| format!("failed to read TLS private key from {}", cfg.tls_key_path))?;
    let tls_config = server::tls::build_server_config(&cert_pem, &key_pem)?;

    // -----------------------------------------------------------------------
    // 4. Router
    // -----------------------------------------------------------------------
    let state = AppState::new(OrderStore::new(), cfg.finalize_authorizations);
    let router = server::router::build(state);

    // -----------------------------------------------------------------------
    // 5. HTTPS server
    // -----------------------------------------------------------------------
    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.tls_port).into();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "listening");

    server::tls::serve(listener, tls_config, router).await
}
