//! Progress tick scheduling
//!
//! The player never sleeps itself. A scheduler posts `session` ids back into
//! the application's event loop at a fixed cadence, and the player ignores
//! ticks for any session other than the live one.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Identifies one load-and-play of a track
pub type SessionId = u64;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);
pub const MAX_TICK_INTERVAL: Duration = Duration::from_millis(150);

pub trait TickScheduler: Send {
    /// Start ticking for `session`, stopping any earlier loop first.
    fn start(&mut self, session: SessionId);

    /// Stop ticking. Nothing is posted after this returns.
    fn cancel(&mut self);
}

/// Ticks from a tokio interval task, posted as messages of type `M`
pub struct IntervalScheduler<M> {
    period: Duration,
    tx: UnboundedSender<M>,
    wrap: fn(SessionId) -> M,
    task: Option<JoinHandle<()>>,
}

impl<M: Send + 'static> IntervalScheduler<M> {
    pub fn new(period: Duration, tx: UnboundedSender<M>, wrap: fn(SessionId) -> M) -> Self {
        Self {
            period: period.clamp(Duration::from_millis(10), MAX_TICK_INTERVAL),
            tx,
            wrap,
            task: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl<M: Send + 'static> TickScheduler for IntervalScheduler<M> {
    fn start(&mut self, session: SessionId) {
        self.cancel();

        let tx = self.tx.clone();
        let wrap = self.wrap;
        let period = self.period;
        tracing::trace!(session, period_ms = period.as_millis() as u64, "Starting progress loop");

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(wrap(session)).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl<M> Drop for IntervalScheduler<M> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionId>) -> Vec<SessionId> {
        let mut ticks = Vec::new();
        while let Ok(session) = rx.try_recv() {
            ticks.push(session);
        }
        ticks
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_carry_the_session() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = IntervalScheduler::new(DEFAULT_TICK_INTERVAL, tx, |s| s);

        scheduler.start(1);
        tokio::time::sleep(Duration::from_millis(350)).await;

        let ticks = drain(&mut rx);
        assert!(ticks.len() >= 2, "got {ticks:?}");
        assert!(ticks.iter().all(|&s| s == 1));
    }

    #[tokio::test(start_paused = true)]
    async fn restarting_stops_the_old_loop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = IntervalScheduler::new(DEFAULT_TICK_INTERVAL, tx, |s| s);

        scheduler.start(1);
        tokio::time::sleep(Duration::from_millis(250)).await;
        scheduler.start(2);
        drain(&mut rx);

        tokio::time::sleep(Duration::from_millis(450)).await;
        let ticks = drain(&mut rx);
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|&s| s == 2), "got {ticks:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_posting() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut scheduler = IntervalScheduler::new(DEFAULT_TICK_INTERVAL, tx, |s| s);

        scheduler.start(7);
        tokio::time::sleep(Duration::from_millis(150)).await;
        scheduler.cancel();
        drain(&mut rx);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(drain(&mut rx).is_empty());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn cadence_is_capped() {
        let (tx, _rx) = mpsc::unbounded_channel::<SessionId>();
        let scheduler = IntervalScheduler::new(Duration::from_secs(1), tx, |s| s);
        assert_eq!(scheduler.period(), MAX_TICK_INTERVAL);
    }
}
