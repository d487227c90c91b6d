use std::sync::Arc;
use std::time::Duration;

use conduit_core::{ConduitError, ResetProvider};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::fanout::panic_message;

use super::state::{Action, Event, ResetMachine, ResetStatus};

pub struct WorkerParams {
    pub target: Arc<dyn ResetProvider>,
    pub poll_interval: Duration,
    pub requests: mpsc::Receiver<()>,
    pub status: watch::Sender<ResetStatus>,
}

pub fn spawn_reset_worker(params: WorkerParams, mut stop: watch::Receiver<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let WorkerParams {
            target,
            poll_interval,
            mut requests,
            status,
        } = params;

        let mut machine = ResetMachine::new();
        // Set once the stop channel has fired or closed so it is not polled again.
        let mut stop_seen = false;

        #[cfg(feature = "tracing")]
        tracing::info!(
            poll_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            "reset worker started"
        );

        let mut next_event = None;
        loop {
            let event = match next_event.take() {
                Some(e) => e,
                None if stop_seen || *stop.borrow() => Event::Shutdown,
                None => {
                    tokio::select! {
                        biased;
                        _ = stop.changed() => {
                            stop_seen = true;
                            Event::Shutdown
                        }
                        recv = tokio::time::timeout(poll_interval, requests.recv()) => match recv {
                            Ok(Some(())) => Event::RequestReceived,
                            Ok(None) => Event::Shutdown,
                            Err(_) => Event::PollElapsed,
                        },
                    }
                }
            };

            let prev_phase = machine.phase();
            let (next, actions) = machine.handle(event);
            machine = next;
            if machine.phase() != prev_phase {
                status.send_replace(machine.status().clone());
            }

            for action in actions {
                match action {
                    Action::RunReset => {
                        #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
                        let run = machine.status().completed + 1;
                        #[cfg(feature = "tracing")]
                        tracing::info!(run, "reset sequence starting");

                        let target = Arc::clone(&target);
                        let mut task = tokio::spawn(async move { target.reset().await });
                        let joined = loop {
                            tokio::select! {
                                joined = &mut task => break joined,
                                _ = stop.changed(), if !stop_seen => {
                                    stop_seen = true;
                                    let (next, _) = machine.handle(Event::Shutdown);
                                    machine = next;
                                    status.send_replace(machine.status().clone());
                                }
                            }
                        };
                        let result = match joined {
                            Ok(res) => res,
                            Err(e) if e.is_panic() => {
                                let msg = panic_message(e.into_panic());
                                #[cfg(feature = "tracing")]
                                tracing::error!(run, panic = %msg, "reset sequence panicked");
                                Err(ConduitError::ResetPanicked(msg))
                            }
                            Err(e) => Err(ConduitError::Other(e.to_string())),
                        };
                        #[cfg(feature = "tracing")]
                        match &result {
                            Ok(()) => tracing::info!(run, "reset sequence finished"),
                            Err(e) => tracing::warn!(run, error = %e, "reset sequence failed"),
                        }
                        next_event = Some(Event::ResetFinished(result));
                    }
                    Action::PublishCompletion => {
                        status.send_replace(machine.status().clone());
                    }
                    Action::Exit => {
                        #[cfg(feature = "tracing")]
                        tracing::info!(
                            completed = machine.status().completed,
                            "reset worker stopped"
                        );
                        return;
                    }
                }
            }
        }
    })
}
