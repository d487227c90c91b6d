//! conduit-core
//!
//! Domain model and contracts shared across the conduit workspace.
//!
//! - `types`: orders, history requests, holdings, cash and broker events.
//! - `broker`: the `Broker` trait and the `ResetProvider` role trait.
//! - `events`: subscriber handlers and a thread-safe registry for brokers.
//! - `aggregate`: helpers that merge holdings and cash across brokers.
//!
//! Nothing in this crate depends on a particular async runtime; the
//! orchestrator in `conduit` drives the traits on Tokio.
#![warn(missing_docs)]

/// Helpers to merge account snapshots from multiple brokers.
pub mod aggregate;
/// The broker contract and its optional role traits.
pub mod broker;
/// Event handlers and the subscriber registry.
pub mod events;
pub mod types;

pub use aggregate::{merge_cash, merge_holdings};
pub use broker::{Broker, ResetProvider};
pub use events::{EventHandler, EventRegistry, Handler};
pub use types::*;
