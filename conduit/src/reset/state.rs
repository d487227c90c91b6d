use conduit_core::ConduitError;

/// Where the reset worker currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetPhase {
    /// Idle, waiting for a request.
    Waiting,
    /// A reset sequence is running.
    Resetting,
    /// Shutdown was requested while a reset was running; the worker exits
    /// once that reset finishes.
    Stopping,
    /// The worker has exited.
    Terminated,
}

/// Snapshot published by the worker after every state change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetStatus {
    /// Current phase.
    pub phase: ResetPhase,
    /// Number of reset executions completed so far.
    pub completed: u64,
    /// Error of the most recent execution, `None` if it succeeded or none ran yet.
    pub last_error: Option<ConduitError>,
}

impl ResetStatus {
    pub(crate) const fn initial() -> Self {
        Self {
            phase: ResetPhase::Waiting,
            completed: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    RequestReceived,
    ResetFinished(Result<(), ConduitError>),
    PollElapsed,
    Shutdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RunReset,
    PublishCompletion,
    Exit,
}

/// Pure transition table of the reset worker. The driver in `reset::worker`
/// performs the actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetMachine {
    status: ResetStatus,
}

impl Default for ResetMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ResetMachine {
    pub const fn new() -> Self {
        Self {
            status: ResetStatus::initial(),
        }
    }

    pub const fn phase(&self) -> ResetPhase {
        self.status.phase
    }

    pub const fn status(&self) -> &ResetStatus {
        &self.status
    }

    pub fn handle(mut self, event: Event) -> (Self, Vec<Action>) {
        use ResetPhase::{Resetting, Stopping, Terminated, Waiting};

        let actions = match (self.status.phase, event) {
            (Waiting, Event::RequestReceived) => {
                self.status.phase = Resetting;
                vec![Action::RunReset]
            }
            (Waiting, Event::Shutdown) => {
                self.status.phase = Terminated;
                vec![Action::Exit]
            }
            (Resetting, Event::Shutdown) => {
                self.status.phase = Stopping;
                vec![]
            }
            (Resetting, Event::ResetFinished(result)) => {
                self.record(result);
                self.status.phase = Waiting;
                vec![Action::PublishCompletion]
            }
            (Stopping, Event::ResetFinished(result)) => {
                self.record(result);
                self.status.phase = Terminated;
                vec![Action::PublishCompletion, Action::Exit]
            }
            // Polls, requests that arrive mid-reset and anything after exit are no-ops.
            _ => vec![],
        };
        (self, actions)
    }

    fn record(&mut self, result: Result<(), ConduitError>) {
        self.status.completed += 1;
        self.status.last_error = result.err();
    }
}
