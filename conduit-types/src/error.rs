use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{BrokerId, BrokerKind, SecurityType};

/// Configuration errors raised by routing policies.
///
/// These are never retried: they mean the policy and the loaded brokers do
/// not agree, and the caller has to fix the setup.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoutingError {
    /// The policy has no entry for the instrument class being routed.
    #[error("no broker mapped for security type {security_type}")]
    NoMapping {
        /// Instrument class that was looked up.
        security_type: SecurityType,
    },

    /// The policy chose a broker kind that is not among the loaded brokers.
    #[error("the specified broker is not loaded: {kind}")]
    BrokerNotLoaded {
        /// Kind returned by the classifier.
        kind: BrokerKind,
    },

    /// More than one loaded broker has the chosen kind.
    #[error("broker {kind} is loaded {count} times; route by id instead of kind")]
    AmbiguousBroker {
        /// Kind returned by the classifier.
        kind: BrokerKind,
        /// Number of loaded brokers with that kind.
        count: usize,
    },
}

/// Unified error type for the conduit workspace.
///
/// Covers routing/configuration failures, broker-tagged failures, per-broker
/// timeouts, fan-out aggregates and reset supervision.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConduitError {
    /// The routing policy could not pick a broker.
    #[error("routing failed: {0}")]
    Routing(#[from] RoutingError),

    /// The routing policy returned an id that is not part of the composite.
    #[error("routing policy selected unknown broker {id}")]
    UnknownBroker {
        /// Id returned by the policy.
        id: BrokerId,
    },

    /// An individual broker returned an error.
    #[error("{broker} failed: {msg}")]
    Broker {
        /// Broker name that failed.
        broker: String,
        /// Human-readable error message.
        msg: String,
    },

    /// A broker call exceeded the configured fan-out timeout.
    #[error("broker timed out: {operation} via {broker}")]
    BrokerTimeout {
        /// Broker name that timed out.
        broker: String,
        /// Operation label (e.g. "connect", "holdings").
        operation: String,
    },

    /// Several brokers failed during one fan-out; contains every failure.
    #[error("{operation} failed on {} brokers: {errors:?}", errors.len())]
    BrokersFailed {
        /// Operation label of the fan-out.
        operation: String,
        /// Individual failures, in broker construction order.
        errors: Vec<ConduitError>,
    },

    /// Invalid input argument or builder configuration.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The broker does not implement the requested capability.
    #[error("unsupported capability: {capability}")]
    Unsupported {
        /// Capability label (e.g. "reset").
        capability: String,
    },

    /// The reset supervisor's worker is no longer running.
    #[error("reset supervisor has stopped")]
    SupervisorStopped,

    /// The reset procedure panicked; the payload message is kept when available.
    #[error("reset procedure panicked: {0}")]
    ResetPanicked(String),

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl ConduitError {
    /// Helper: build a `Broker` error with the broker name and message.
    pub fn broker(broker: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Broker {
            broker: broker.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `BrokerTimeout` error.
    pub fn broker_timeout(broker: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::BrokerTimeout {
            broker: broker.into(),
            operation: operation.into(),
        }
    }

    /// Helper: build an `Unsupported` error for a capability string.
    #[must_use]
    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    /// Returns true for errors caused by routing setup rather than by a broker.
    ///
    /// Such errors are surfaced immediately and should not be retried.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Routing(_) | Self::UnknownBroker { .. })
    }

    /// Flatten nested `BrokersFailed` structures into a plain vector.
    ///
    /// This preserves other error variants as-is and unwraps recursively.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::BrokersFailed { errors, .. } => {
                errors.into_iter().flat_map(Self::flatten).collect()
            }
            other => vec![other],
        }
    }
}
