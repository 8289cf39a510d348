//! Cooperative stop signal for a run.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared stop flag.
///
/// Once stopped, the tracker dispatches no new job; jobs already on a host
/// finish their current attempt. Clones observe the same flag.
#[derive(Debug, Clone)]
pub struct RunControl {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for RunControl {
    fn default() -> Self {
        Self::new()
    }
}

impl RunControl {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests the run to stop. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Completes once [`stop`](Self::stop) has been called.
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only ends on a stop.
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_wakes_waiters() {
        let control = RunControl::new();
        assert!(!control.is_stopped());

        let waiter = {
            let control = control.clone();
            tokio::spawn(async move { control.stopped().await })
        };

        control.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(control.is_stopped());
    }

    #[test]
    fn test_stopped_pending_until_stop() {
        let control = RunControl::new();
        let mut stopped = tokio_test::task::spawn(control.stopped());
        tokio_test::assert_pending!(stopped.poll());

        control.stop();
        assert!(stopped.is_woken());
        tokio_test::assert_ready!(stopped.poll());
    }

    #[tokio::test]
    async fn test_stopped_returns_immediately_when_already_stopped() {
        let control = RunControl::new();
        control.stop();
        control.stop();
        tokio::time::timeout(Duration::from_millis(100), control.stopped())
            .await
            .unwrap();
    }
}
