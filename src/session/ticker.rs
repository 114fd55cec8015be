use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Recurring countdown tick, delivered over a channel as the generation that
/// produced it.
///
/// At most one tick task is alive at a time. `stop` (and `Drop`) abort it, and
/// every `start` bumps the generation so ticks already queued by an earlier
/// task can be told apart with `is_current`.
pub struct Ticker {
    tx: UnboundedSender<u64>,
    period: Duration,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new(tx: UnboundedSender<u64>) -> Self {
        Self::with_period(tx, TICK_PERIOD)
    }

    pub fn with_period(tx: UnboundedSender<u64>, period: Duration) -> Self {
        Self { tx, period, generation: 0, handle: None }
    }

    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        self.stop();
        self.generation += 1;

        let generation = self.generation;
        let period = self.period;
        let tx = self.tx.clone();
        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tx.send(generation).is_err() {
                    break;
                }
            }
        }));
        log::debug!("Ticker started (generation {})", generation);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::debug!("Ticker stopped (generation {})", self.generation);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_running() && generation == self.generation
    }

    /// Starts or stops the task so that it runs exactly when `wanted`.
    pub fn sync(&mut self, wanted: bool) {
        match (wanted, self.is_running()) {
            (true, false) => self.start(),
            (false, true) => self.stop(),
            _ => {}
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_ticks_carry_current_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_period(tx, Duration::from_millis(10));

        ticker.start();
        let generation = rx.recv().await.unwrap();

        assert!(ticker.is_current(generation));
        assert_eq!(rx.recv().await, Some(generation));
    }

    #[tokio::test]
    async fn test_restart_invalidates_old_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_period(tx, Duration::from_millis(10));

        ticker.start();
        let first = rx.recv().await.unwrap();
        ticker.start();

        assert!(!ticker.is_current(first));
        loop {
            let generation = rx.recv().await.unwrap();
            if generation != first {
                assert!(ticker.is_current(generation));
                break;
            }
        }
    }

    #[tokio::test]
    async fn test_stop_ends_ticks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_period(tx, Duration::from_millis(10));

        ticker.start();
        let generation = rx.recv().await.unwrap();
        ticker.stop();

        assert!(!ticker.is_running());
        assert!(!ticker.is_current(generation));

        tokio::time::sleep(Duration::from_millis(20)).await;
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_sync_follows_wanted_flag() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_period(tx, Duration::from_millis(10));

        ticker.sync(true);
        assert!(ticker.is_running());
        ticker.sync(true);
        assert!(ticker.is_running());
        ticker.sync(false);
        assert!(!ticker.is_running());
    }

    #[tokio::test]
    async fn test_drop_closes_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut ticker = Ticker::with_period(tx, Duration::from_millis(10));
        ticker.start();
        drop(ticker);

        // the aborted task releases its sender; draining ends with None
        tokio::time::timeout(Duration::from_secs(1), async { while rx.recv().await.is_some() {} })
            .await
            .unwrap();
    }
}
