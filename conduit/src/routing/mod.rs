//! Policies that pick the broker for a single-target operation.
//!
//! A policy receives the composite's fixed list of broker ids (in
//! construction order) together with the order or history request, and
//! returns the id of the broker that must handle it. Policies are pure:
//! they never mutate state and may be shared across threads.

use conduit_core::{BrokerId, HistoryRequest, Order, RoutingError};

mod custom;
mod security_type;
mod single;

pub use custom::{BrokerClassifier, CustomRouter, FnClassifier};
pub use security_type::SecurityTypeRouter;
pub use single::SingleBrokerRouter;

/// Chooses which broker handles an order operation or a history request.
pub trait RoutingPolicy: Send + Sync {
    /// Broker for placing, updating or cancelling `order`.
    ///
    /// # Errors
    /// Returns a [`RoutingError`] when no loaded broker can be selected.
    fn route_order(&self, candidates: &[BrokerId], order: &Order) -> Result<BrokerId, RoutingError>;

    /// Broker for serving `request`.
    ///
    /// # Errors
    /// Returns a [`RoutingError`] when no loaded broker can be selected.
    fn route_history(
        &self,
        candidates: &[BrokerId],
        request: &HistoryRequest,
    ) -> Result<BrokerId, RoutingError>;
}
