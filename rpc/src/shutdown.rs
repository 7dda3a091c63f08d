//! Stop signal for the HTTP server.
//!
//! The server is the only long-lived task, so in practice there is one
//! listener: the future handed to axum's graceful shutdown. The signal
//! watcher and tests both fire the same trigger.

use tokio::signal;
use tokio::sync::broadcast;

/// Fires once, on SIGINT/SIGTERM or when [`ShutdownController::shutdown`] is
/// called. Dropping the controller also releases every waiter.
pub struct ShutdownController {
    tx: broadcast::Sender<()>,
}

impl ShutdownController {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Raw receiver, for callers that want to `select!` on the stop signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Future for `with_graceful_shutdown`: resolves on the trigger or
    /// when the controller goes away.
    pub fn signalled(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            let _ = rx.recv().await;
        }
    }

    /// Stop now.
    pub fn shutdown(&self) {
        let _ = self.tx.send(());
    }

    /// Block until the process is asked to stop, then fire the trigger.
    pub async fn wait_for_signal(&self) {
        let ctrl_c = signal::ctrl_c();

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => { tracing::info!(signal = "SIGINT", "stopping server"); }
            _ = terminate => { tracing::info!(signal = "SIGTERM", "stopping server"); }
        }

        self.shutdown();
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_controller_releases_server() {
        let controller = ShutdownController::new();
        let signalled = tokio::spawn(controller.signalled());
        drop(controller);
        tokio::time::timeout(std::time::Duration::from_secs(1), signalled)
            .await
            .expect("waiter released")
            .unwrap();
    }

    #[tokio::test]
    async fn explicit_shutdown_reaches_receiver() {
        let controller = ShutdownController::new();
        let mut rx = controller.subscribe();
        controller.shutdown();
        assert!(rx.recv().await.is_ok());
    }

    #[tokio::test]
    async fn signalled_future_completes_after_shutdown() {
        let controller = ShutdownController::new();
        let signalled = tokio::spawn(controller.signalled());
        controller.shutdown();
        tokio::time::timeout(std::time::Duration::from_secs(1), signalled)
            .await
            .expect("shutdown observed")
            .unwrap();
    }
}
