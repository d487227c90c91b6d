//! Configuration types shared by the orchestrator and the reset supervisor.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{BrokerId, SecurityType};

/// Configuration for a `CompositeBroker`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Upper bound for each broker call made during a fan-out
    /// (connect, disconnect, open orders, holdings, cash).
    ///
    /// `None` waits for every broker as long as it takes. Routed single-broker
    /// calls are never bounded by this value.
    pub fanout_timeout: Option<Duration>,
}

/// Configuration for a `ResetSupervisor` worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetConfig {
    /// How long the idle worker waits for a request before re-checking for
    /// shutdown. Teardown completes within one interval. Intervals below
    /// 10 ms are raised to 10 ms by the supervisor.
    pub poll_interval: Duration,
}

impl Default for ResetConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

/// Serializable instrument-class routing table.
///
/// Later calls to [`RoutingTable::route`] for the same class overwrite earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingTable {
    /// Broker chosen for each instrument class.
    pub routes: HashMap<SecurityType, BrokerId>,
}

impl RoutingTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Route every symbol of `security_type` to `broker`.
    #[must_use]
    pub fn route(mut self, security_type: SecurityType, broker: BrokerId) -> Self {
        self.routes.insert(security_type, broker);
        self
    }

    /// Look up the broker for `security_type`.
    #[must_use]
    pub fn get(&self, security_type: SecurityType) -> Option<&BrokerId> {
        self.routes.get(&security_type)
    }
}
