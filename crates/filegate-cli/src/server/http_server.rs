//! HTTP server startup.

use std::future::pending;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use super::lifecycle::serve_with_shutdown;
use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};
use crate::config::ServerConfig;

/// Starts an HTTP server with graceful shutdown.
///
/// Validates the configuration, binds to the configured address and serves
/// requests until Ctrl+C or SIGTERM. In-flight requests get up to the
/// configured shutdown timeout to finish.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    server_config
        .validate()
        .map_err(|err| ServerError::invalid_config(&err))?;

    let server_addr = server_config.server_addr();
    let listener = TcpListener::bind(server_addr)
        .await
        .map_err(|err| ServerError::bind_error(&server_addr.to_string(), err))?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let (signalled_tx, signalled_rx) = oneshot::channel();
        let signal = async move {
            shutdown_signal(shutdown_timeout).await;
            let _ = signalled_tx.send(());
        };

        let server = async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(signal)
            .await
        };

        tokio::select! {
            result = server => result,
            () = drain_deadline(signalled_rx, shutdown_timeout) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Graceful shutdown timed out, dropping open connections"
                );
                Ok(())
            }
        }
    })
    .await
    .map_err(ServerError::Runtime)
}

/// Completes `timeout` after the shutdown signal fired; never otherwise.
async fn drain_deadline(signalled: oneshot::Receiver<()>, timeout: Duration) {
    if signalled.await.is_ok() {
        tokio::time::sleep(timeout).await;
    } else {
        pending::<()>().await;
    }
}
