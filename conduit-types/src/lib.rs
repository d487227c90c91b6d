//! Conduit-specific identifiers, errors and configuration primitives.
//!
//! This crate carries no async machinery; it is shared by the core contracts,
//! the orchestrator and the mock brokers.
#![warn(missing_docs)]

mod broker_id;
mod config;
mod error;
mod security;

pub use broker_id::{BrokerId, BrokerKind, DEFAULT_ACCOUNT};
pub use config::{CompositeConfig, ResetConfig, RoutingTable};
pub use error::{ConduitError, RoutingError};
pub use security::SecurityType;
