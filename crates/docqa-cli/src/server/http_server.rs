//! HTTP server startup and signal-driven drain.

use std::future::IntoFuture;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use super::lifecycle::serve_with_shutdown;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};

/// Binds the configured address and serves `app` until a shutdown signal.
///
/// In-flight requests get the configured shutdown timeout to finish.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    let server_addr = server_config.server_addr();

    let listener = TcpListener::bind(server_addr).await.map_err(|err| {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            addr = %server_addr,
            error = %err,
            "failed to bind to address"
        );
        ServerError::bind_error(server_addr, err)
    })?;

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let (notify_tx, notify_rx) = tokio::sync::oneshot::channel::<()>();
        let signal = async move {
            let received = termination_signal().await;
            tracing::info!(
                target: TRACING_TARGET_SHUTDOWN,
                signal = received,
                timeout_secs = shutdown_timeout.as_secs(),
                "draining in-flight requests"
            );
            let _ = notify_tx.send(());
        };

        let server = axum::serve(listener, app)
            .with_graceful_shutdown(signal)
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => result,
            () = drain_deadline(notify_rx, shutdown_timeout) => {
                tracing::warn!(
                    target: TRACING_TARGET_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "shutdown timeout elapsed, dropping in-flight requests"
                );
                Ok(())
            }
        }
    })
    .await
}

/// Resolves once shutdown started and `timeout` has passed since.
async fn drain_deadline(started: tokio::sync::oneshot::Receiver<()>, timeout: Duration) {
    if started.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(timeout).await;
}

/// Resolves with the name of the first termination signal received.
///
/// A handler that cannot be installed never fires.
async fn termination_signal() -> &'static str {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(target: TRACING_TARGET_SHUTDOWN, error = %e, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(target: TRACING_TARGET_SHUTDOWN, error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => "SIGINT",
        () = terminate => "SIGTERM",
    }
}
