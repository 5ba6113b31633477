//! The recurring notification check
//!
//! One periodic timer drives [`TaskTracker::end_of_day_tick`]; everything it appends
//! goes through the tracker, so this module only owns the timing and the shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::tracker::TaskTracker;
use crate::traits::TaskStore;

/// How often the scheduler inspects the clock
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(60);

/// A handle on the running notification scheduler.
///
/// The scheduler must be stopped when the session ends: a tracker tick checks the
/// session itself, but a stopped scheduler cannot leak ticks across session
/// boundaries at all.
pub struct Scheduler {
    shutdown: watch::Sender<bool>,
    join_handle: JoinHandle<()>,
}

impl Scheduler {
    /// Start ticking `tracker` every `tick_interval`.
    ///
    /// The timer tick itself never blocks: the only await points are the tracker lock
    /// and the tracker's own non-blocking store calls.
    pub fn spawn<S>(tracker: Arc<Mutex<TaskTracker<S>>>, tick_interval: Duration) -> Self
    where
        S: TaskStore + Send + Sync + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let join_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(tick_interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut tracker = tracker.lock().await;
                        match tracker.end_of_day_tick().await {
                            Ok(true) => log::info!("End-of-day summary fired"),
                            Ok(false) => log::trace!("Scheduler tick: nothing to do"),
                            // Tick failures never stop the timer
                            Err(err) => log::warn!("Scheduler tick failed: {}", err),
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            log::debug!("Notification scheduler stopped");
                            return;
                        }
                    }
                }
            }
        });

        Self {
            shutdown,
            join_handle,
        }
    }

    /// Request the scheduler to stop. No tick starts after this call returns; a tick
    /// already holding the tracker finishes first.
    pub fn stop(&self) {
        // The only send error is "receiver dropped", i.e. the loop already ended
        let _ = self.shutdown.send(true);
    }

    /// Stop the scheduler and wait for its task to finish
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.join_handle.await;
    }
}
