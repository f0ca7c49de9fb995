//! HTTP server lifecycle.
//!
//! bind -> serve until the shutdown future resolves -> drain in-flight
//! requests.

use std::future::Future;
use std::net::SocketAddr;

use axum::Router;

/// Serve `app` on `addr` until `shutdown` completes.
///
/// # Errors
/// Returns error if the address cannot be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, app: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!(%local, "Readmission API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Readmission API stopped");
    Ok(())
}

/// Resolves on Ctrl-C (and SIGTERM on unix).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Cannot listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Cannot listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn serve_stops_on_shutdown() {
        let app = Router::new().route("/healthz", get(|| async { "ok" }));
        let (tx, rx) = oneshot::channel::<()>();

        let addr: SocketAddr = "127.0.0.1:0".parse().expect("Valid addr");
        let handle = tokio::spawn(serve(addr, app, async move {
            let _ = rx.await;
        }));

        tx.send(()).expect("Server should be waiting");
        handle
            .await
            .expect("Task should join")
            .expect("Server should stop cleanly");
    }
}
