//! Serialized, coalescing execution of broker reset sequences.
//!
//! A [`ResetSupervisor`] owns one worker task per reset target. Callers ask
//! for a reset with [`ResetSupervisor::request_reset`]; the worker runs at most
//! one reset at a time, and a request that arrives while one is already
//! pending is merged with it.
//!
//! Coalescing caveat: a caller whose request is merged may be released by the
//! completion of an execution that was already running when it asked, rather
//! than by one that started after its request.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::{Broker, ConduitError, ResetConfig, ResetProvider};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

mod state;
mod worker;

pub use state::{ResetPhase, ResetStatus};

use worker::{WorkerParams, spawn_reset_worker};

/// Shortest idle wait the worker accepts; smaller configured intervals are raised to it.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle to a running reset worker.
///
/// Dropping the handle signals the worker to stop; use
/// [`shutdown`](Self::shutdown) to also wait for it. A reset that is already
/// running is always allowed to finish.
pub struct ResetSupervisor {
    requests: mpsc::Sender<()>,
    status: watch::Receiver<ResetStatus>,
    stop: watch::Sender<bool>,
    join: Option<JoinHandle<()>>,
    poll_interval: Duration,
}

struct BrokerReset(Arc<dyn Broker>);

#[async_trait]
impl ResetProvider for BrokerReset {
    async fn reset(&self) -> Result<(), ConduitError> {
        match self.0.as_reset_provider() {
            Some(p) => p.reset().await,
            None => Err(ConduitError::unsupported("reset")),
        }
    }
}

impl ResetSupervisor {
    /// Spawn a worker that runs `target.reset()` on request.
    ///
    /// A `poll_interval` below [`MIN_POLL_INTERVAL`] is raised to it.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(target: Arc<dyn ResetProvider>, cfg: ResetConfig) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<()>(1);
        let (status_tx, status_rx) = watch::channel(ResetStatus::initial());
        let (stop_tx, stop_rx) = watch::channel(false);
        let poll_interval = cfg.poll_interval.max(MIN_POLL_INTERVAL);
        #[cfg(feature = "tracing")]
        if poll_interval != cfg.poll_interval {
            tracing::warn!(
                requested = ?cfg.poll_interval,
                used = ?poll_interval,
                "reset poll interval below minimum; clamped"
            );
        }

        let join = spawn_reset_worker(
            WorkerParams {
                target,
                poll_interval,
                requests: req_rx,
                status: status_tx,
            },
            stop_rx,
        );

        Self {
            requests: req_tx,
            status: status_rx,
            stop: stop_tx,
            join: Some(join),
            poll_interval,
        }
    }

    /// Spawn a worker for a broker that advertises the reset capability.
    ///
    /// # Errors
    /// Returns `Unsupported("reset")` if `broker.as_reset_provider()` is `None`.
    ///
    /// # Panics
    /// Panics if called outside a Tokio runtime.
    pub fn for_broker(broker: Arc<dyn Broker>, cfg: ResetConfig) -> Result<Self, ConduitError> {
        if broker.as_reset_provider().is_none() {
            return Err(ConduitError::unsupported("reset"));
        }
        Ok(Self::spawn(Arc::new(BrokerReset(broker)), cfg))
    }

    /// Ask for a reset and wait until the worker completes one.
    ///
    /// Returns the outcome of the execution that released this caller. If a
    /// request is already pending, this one is merged with it.
    ///
    /// # Errors
    /// Returns the reset's own error, `ResetPanicked` if it panicked, or
    /// `SupervisorStopped` if the worker exits before completing a reset.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "conduit::reset::request_reset", skip_all))]
    pub async fn request_reset(&self) -> Result<(), ConduitError> {
        let mut status = self.status.clone();
        let seen = status.borrow().completed;

        match self.requests.try_send(()) {
            Ok(()) => {}
            Err(TrySendError::Full(())) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("reset already pending; coalescing");
            }
            Err(TrySendError::Closed(())) => return Err(ConduitError::SupervisorStopped),
        }

        let done = status
            .wait_for(|s| s.completed > seen)
            .await
            .map_err(|_| ConduitError::SupervisorStopped)?;
        match &done.last_error {
            None => Ok(()),
            Some(e) => Err(e.clone()),
        }
    }

    /// Whether the most recent completed reset succeeded. `true` before any reset ran.
    #[must_use]
    pub fn was_last_reset_successful(&self) -> bool {
        self.status.borrow().last_error.is_none()
    }

    /// Error of the most recent completed reset, if it failed.
    #[must_use]
    pub fn last_error(&self) -> Option<ConduitError> {
        self.status.borrow().last_error.clone()
    }

    /// Current worker phase.
    #[must_use]
    pub fn phase(&self) -> ResetPhase {
        self.status.borrow().phase
    }

    /// Idle wait the worker actually uses.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Number of reset executions completed so far.
    #[must_use]
    pub fn completed_resets(&self) -> u64 {
        self.status.borrow().completed
    }

    /// Ask the worker to stop without waiting for it.
    ///
    /// An idle worker exits within one poll interval; a running reset is
    /// allowed to finish first.
    pub fn signal_shutdown(&self) {
        let _ = self.stop.send(true);
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// # Errors
    /// Returns `Other` if the worker task itself panicked or was cancelled.
    pub async fn shutdown(mut self) -> Result<(), ConduitError> {
        self.signal_shutdown();
        match self.join.take() {
            Some(join) => join.await.map_err(|e| ConduitError::Other(e.to_string())),
            None => Ok(()),
        }
    }
}

impl Drop for ResetSupervisor {
    fn drop(&mut self) {
        let _ = self.stop.send(true);
    }
}
