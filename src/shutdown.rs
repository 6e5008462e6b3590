// this_file: src/shutdown.rs
//! Graceful shutdown signal handling.
//!
//! Produces a future that resolves when the process receives a termination
//! signal, for use with `axum::serve(..).with_graceful_shutdown()`.

use log::{error, info};

/// Resolve when an OS shutdown signal is received.
///
/// On Unix this listens for both SIGINT (Ctrl+C) and SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for SIGINT: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
            }
        }
    };

    #[cfg(unix)]
    {
        tokio::select! {
            () = ctrl_c => {
                info!("Received SIGINT, shutting down");
            }
            () = terminate => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await;
        info!("Received Ctrl+C, shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `axum::serve(..).with_graceful_shutdown()` requires a
    /// `Future<Output = ()> + Send`.
    #[test]
    fn shutdown_signal_is_send_future() {
        fn assert_send_future<T: std::future::Future<Output = ()> + Send>(_f: T) {}
        assert_send_future(shutdown_signal());
    }
}
