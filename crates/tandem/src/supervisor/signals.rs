// ABOUTME: Termination signal handling for the supervisor.
// ABOUTME: Resolves on SIGINT, SIGTERM, or SIGQUIT.

use tokio::signal;

/// Wait for a termination signal (Ctrl+C, SIGTERM, or SIGQUIT).
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(unix)]
    let quit = async {
        signal::unix::signal(signal::unix::SignalKind::quit())
            .expect("failed to install SIGQUIT handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    #[cfg(not(unix))]
    let quit = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received interrupt, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received terminate, shutting down");
        }
        _ = quit => {
            tracing::info!("Received quit, shutting down");
        }
    }
}
