//! Shutdown request shared between the signal handler and the monitor loop

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Requests shutdown of every paired [`ShutdownSignal`]
#[derive(Debug)]
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>,
}

/// Observes a shutdown request
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

pub fn channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger { sender }, ShutdownSignal { receiver })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }
}

impl ShutdownSignal {
    pub fn is_requested(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Resolve once shutdown has been requested
    ///
    /// A dropped trigger is not a request; the future then never resolves.
    pub async fn requested(&mut self) {
        let changed = self.receiver.wait_for(|requested| *requested).await.map(|_| ());
        if changed.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless shutdown is requested first
    ///
    /// Returns `false` if the sleep was cut short.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => true,
            _ = self.requested() => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[tokio::test]
    async fn trigger_wakes_waiting_signal() {
        let (trigger, mut signal) = channel();
        assert!(!signal.is_requested());

        let waiter = tokio::spawn(async move {
            signal.requested().await;
            signal.is_requested()
        });
        trigger.trigger();

        let requested = timeout(Duration::from_secs(1), waiter).await.unwrap().unwrap();
        assert!(requested);
    }

    #[tokio::test]
    async fn request_before_waiting_is_not_lost() {
        let (trigger, mut signal) = channel();
        trigger.trigger();
        assert!(timeout(Duration::from_secs(1), signal.requested()).await.is_ok());
    }

    #[tokio::test]
    async fn sleep_is_cut_short_by_request() {
        let (trigger, mut signal) = channel();
        trigger.trigger();
        let completed = timeout(Duration::from_secs(1), signal.sleep(Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(!completed);
    }

    #[tokio::test]
    async fn sleep_completes_without_request() {
        let (_trigger, mut signal) = channel();
        assert!(signal.sleep(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn dropped_trigger_is_not_a_request() {
        let (trigger, mut signal) = channel();
        drop(trigger);
        assert!(!signal.is_requested());
        assert!(timeout(Duration::from_millis(50), signal.requested()).await.is_err());
    }
}
