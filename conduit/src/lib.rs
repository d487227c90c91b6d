//! Conduit fronts several brokerage connections as a single broker.
//!
//! Overview
//! - [`CompositeBroker`] implements `conduit_core::Broker` on top of a fixed
//!   list of brokers.
//! - Order placement, updates, cancellations and history requests go to
//!   exactly one broker, chosen by a [`RoutingPolicy`].
//! - Connect, disconnect, open orders, holdings and cash balances fan out to
//!   every broker concurrently; holdings and cash are merged per symbol and
//!   per currency.
//! - Events raised by any broker are re-emitted to the composite's
//!   subscribers, unchanged and on the raising thread.
//! - [`ResetSupervisor`] serializes long-running reset sequences for one
//!   connection and coalesces concurrent requests.
//!
//! Key behaviors and trade-offs
//! - Fan-out failure: every broker is attempted; if any fails the operation
//!   fails and no partial result is returned. A single failure surfaces as
//!   that broker's error, several as `ConduitError::BrokersFailed`.
//! - Routing failures (`ConduitError::Routing`, `ConduitError::UnknownBroker`)
//!   are configuration errors and are never retried.
//! - An optional per-broker fan-out timeout keeps one stalled broker from
//!   blocking account reads forever; routed calls are not bounded.
//!
//! Examples
//! Building a composite that routes by instrument class:
//! ```rust,ignore
//! use std::sync::Arc;
//! use conduit::{CompositeBroker, SecurityTypeRouter};
//! use conduit_core::{BrokerId, BrokerKind, RoutingTable, SecurityType};
//!
//! let table = RoutingTable::new()
//!     .route(SecurityType::Equity, ib.id().clone())
//!     .route(SecurityType::Forex, oanda.id().clone());
//!
//! let composite = CompositeBroker::builder()
//!     .with_broker(ib)
//!     .with_broker(oanda)
//!     .routing_policy(SecurityTypeRouter::from_table(table))
//!     .fanout_timeout(std::time::Duration::from_secs(5))
//!     .build()?;
//!
//! composite.connect().await?;
//! let holdings = composite.holdings().await?;
//! ```
//!
//! Supervising resets:
//! ```rust,ignore
//! use conduit::ResetSupervisor;
//! use conduit_core::ResetConfig;
//!
//! let supervisor = ResetSupervisor::for_broker(ib.clone(), ResetConfig::default())?;
//! supervisor.request_reset().await?;
//! assert!(supervisor.was_last_reset_successful());
//! supervisor.shutdown().await?;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
pub(crate) mod fanout;
/// Policies that choose the broker for single-target operations.
pub mod routing;
/// Reset supervision for a single connection.
pub mod reset;

pub use crate::core::{CompositeBroker, CompositeBrokerBuilder};
pub use fanout::{collapse_fanout_errors, tag_err};
pub use reset::{MIN_POLL_INTERVAL, ResetPhase, ResetStatus, ResetSupervisor};
pub use routing::{
    BrokerClassifier, CustomRouter, FnClassifier, RoutingPolicy, SecurityTypeRouter,
    SingleBrokerRouter,
};
