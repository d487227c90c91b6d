use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use conduit_core::{ConduitError, ResetProvider};

/// Reset provider with a scripted outcome per run.
///
/// Runs are numbered from 1. Each run sleeps for the configured delay, then
/// fails or panics if its number was scripted to, and succeeds otherwise.
/// The provider records how many runs overlapped at peak.
#[derive(Debug, Default)]
pub struct ScriptedReset {
    delay: Duration,
    fail_runs: HashSet<usize>,
    panic_runs: HashSet<usize>,
    runs: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedReset {
    /// A provider whose runs succeed immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every run take `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make run number `run` return an error.
    #[must_use]
    pub fn fail_on(mut self, run: usize) -> Self {
        self.fail_runs.insert(run);
        self
    }

    /// Make run number `run` panic.
    #[must_use]
    pub fn panic_on(mut self, run: usize) -> Self {
        self.panic_runs.insert(run);
        self
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    /// Highest number of runs observed in flight at the same time.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResetProvider for ScriptedReset {
    async fn reset(&self) -> Result<(), ConduitError> {
        let run = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = ActiveGuard(&self.active);
        self.peak.fetch_max(now_active, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.panic_runs.contains(&run) {
            panic!("scripted panic on run {run}");
        }
        if self.fail_runs.contains(&run) {
            return Err(ConduitError::broker(
                "scripted-reset",
                format!("run {run} failed"),
            ));
        }
        Ok(())
    }
}
