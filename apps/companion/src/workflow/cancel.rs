use std::sync::Arc;

use tokio::sync::watch;

/// Requests cancellation of the controller's in-flight analysis.
///
/// Cloneable and `Send`, so it can live in another task while the controller
/// is busy. A request made while nothing is running is discarded when the
/// next analysis starts.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelHandle {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Clears any stale request and returns a receiver for this run.
    pub(crate) fn arm(&self) -> watch::Receiver<bool> {
        self.tx.send_replace(false);
        self.tx.subscribe()
    }
}

/// Resolves once cancellation has been requested. Never resolves if the
/// handle side is gone without cancelling.
pub(crate) async fn cancelled(mut rx: watch::Receiver<bool>) {
    let closed = rx.wait_for(|requested| *requested).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
