//! TLS listener setup and accept loop using rustls.
//!
//! The certificate and private key are loaded from the filesystem paths named
//! in the configuration. This module parses them, constructs a
//! `rustls::ServerConfig`, and serves the Axum router over the resulting TLS
//! sessions.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto::Builder as ConnBuilder,
    service::TowerToHyperService,
};
use rustls::ServerConfig;
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{debug, warn};

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// # Errors
///
/// Returns an error if the certificate or key cannot be parsed, or if rustls
/// rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>> {
    let certs = rustls_pemfile::certs(&mut std::io::BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .context("failed to parse TLS certificate chain")?;

    let key = rustls_pemfile::private_key(&mut std::io::BufReader::new(key_pem))
        .context("failed to read TLS private key")?
        .context("no private key found in PEM data")?;

    let mut config = ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("failed to build rustls ServerConfig")?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Accept loop: terminate TLS on each connection and serve the router over it.
///
/// Per-connection failures (handshake errors, resets) are logged and never
/// terminate the loop; transport-level errors stay at the transport level.
pub async fn serve(listener: TcpListener, tls: Arc<ServerConfig>, router: Router) -> Result<()> {
    let acceptor = TlsAcceptor::from(tls);

    loop {
        let (stream, peer_addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept error");
                continue;
            }
        };

        let acceptor = acceptor.clone();
        let service = TowerToHyperService::new(router.clone());

        tokio::spawn(async move {
            let tls_stream = match acceptor.accept(stream).await {
                Ok(s) => s,
                Err(e) => {
                    debug!(%peer_addr, error = %e, "TLS handshake failed");
                    return;
                }
            };

            if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                .serve_connection(TokioIo::new(tls_stream), service)
                .await
            {
                debug!(%peer_addr, error = %e, "connection error");
            }
        });
    }
}
