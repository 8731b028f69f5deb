//! Completion barrier over a dynamically growing set of visit units

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Counts outstanding visit units and lets one caller wait for zero
///
/// Units may be registered while a waiter is already blocked in
/// [`PendingWorkTracker::wait_for_zero`]. The crawl keeps the barrier from
/// firing early structurally: every registration happens either before the
/// waiter starts (the seed) or from inside a unit that is itself still
/// outstanding, so the counter cannot touch zero while work remains.
#[derive(Debug, Default)]
pub struct PendingWorkTracker {
    outstanding: AtomicUsize,
    drained: Notify,
}

impl PendingWorkTracker {
    /// Creates a tracker with no outstanding units
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of work
    ///
    /// Must be called by the dispatcher before the unit is handed off.
    pub fn register(&self) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
    }

    /// Marks one unit of work as finished
    ///
    /// Wakes the waiter when the last outstanding unit completes.
    pub fn complete(&self) {
        let previous = self
            .outstanding
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.drained.notify_waiters(),
            Ok(_) => {}
            Err(_) => tracing::error!("complete() called with no outstanding work"),
        }
    }

    /// Registers one unit and returns a guard that completes it on drop
    pub fn guard(self: &Arc<Self>) -> WorkGuard {
        self.register();
        WorkGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Current number of outstanding units
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// Waits until the outstanding count reaches zero
    ///
    /// Returns immediately if nothing is outstanding.
    pub async fn wait_for_zero(&self) {
        loop {
            let notified = self.drained.notified();
            tokio::pin!(notified);

            // Arm before checking so a completion between the check and the
            // await is not missed.
            notified.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// One registered unit of work
///
/// Dropping the guard completes the unit exactly once, whether the unit
/// returned normally, recorded a failure, or unwound from a panic.
#[derive(Debug)]
#[must_use = "dropping the guard immediately completes the unit"]
pub struct WorkGuard {
    tracker: Arc<PendingWorkTracker>,
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        self.tracker.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_returns_immediately_when_idle() {
        let tracker = PendingWorkTracker::new();
        tokio::time::timeout(Duration::from_secs(1), tracker.wait_for_zero())
            .await
            .expect("idle tracker should not block");
    }

    #[test]
    fn test_register_and_complete_counts() {
        let tracker = PendingWorkTracker::new();
        tracker.register();
        tracker.register();
        assert_eq!(tracker.outstanding(), 2);
        tracker.complete();
        assert_eq!(tracker.outstanding(), 1);
        tracker.complete();
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_complete_without_work_does_not_underflow() {
        let tracker = PendingWorkTracker::new();
        tracker.complete();
        assert_eq!(tracker.outstanding(), 0);
    }

    #[test]
    fn test_guard_completes_on_drop() {
        let tracker = Arc::new(PendingWorkTracker::new());
        let guard = tracker.guard();
        assert_eq!(tracker.outstanding(), 1);
        drop(guard);
        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test]
    async fn test_guard_completes_when_task_panics() {
        let tracker = Arc::new(PendingWorkTracker::new());
        let guard = tracker.guard();

        let handle = tokio::spawn(async move {
            let _guard = guard;
            panic!("unit failed");
        });
        assert!(handle.await.is_err());

        assert_eq!(tracker.outstanding(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_wait_covers_work_registered_during_wait() {
        let tracker = Arc::new(PendingWorkTracker::new());
        let finished = Arc::new(AtomicUsize::new(0));

        // Each unit spawns two more until a fixed generation, registering
        // children before it completes itself.
        fn spawn_unit(
            tracker: &Arc<PendingWorkTracker>,
            finished: &Arc<AtomicUsize>,
            generation: u32,
        ) {
            let guard = tracker.guard();
            let tracker = Arc::clone(tracker);
            let finished = Arc::clone(finished);
            tokio::spawn(async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_millis(5)).await;
                if generation < 5 {
                    spawn_unit(&tracker, &finished, generation + 1);
                    spawn_unit(&tracker, &finished, generation + 1);
                }
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }

        spawn_unit(&tracker, &finished, 0);

        tokio::time::timeout(Duration::from_secs(10), tracker.wait_for_zero())
            .await
            .expect("barrier should complete");

        // 1 + 2 + 4 + 8 + 16 + 32 units
        assert_eq!(finished.load(Ordering::SeqCst), 63);
        assert_eq!(tracker.outstanding(), 0);
    }
}
