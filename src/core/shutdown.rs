use tokio::signal;

#[derive(Debug, Clone, Copy)]
enum ShutdownReason {
    Interrupt,
    Terminate,
}

/// Resolves once the process is asked to stop; axum then drains in-flight requests.
pub(crate) async fn shutdown_signal() {
    let interrupt = async {
        match signal::ctrl_c().await {
            Ok(()) => ShutdownReason::Interrupt,
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGINT");
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                ShutdownReason::Terminate
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<ShutdownReason>();

    let reason = tokio::select! {
        reason = interrupt => reason,
        reason = terminate => reason,
    };

    tracing::info!(reason = ?reason, "Shutting down school portal API");
}
