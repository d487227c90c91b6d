use conduit_core::{BrokerId, HistoryRequest, Order, RoutingError};

use super::RoutingPolicy;

/// Sends every operation to one fixed broker.
///
/// The candidates are not consulted; a target missing from the composite is
/// reported by the composite as an unknown broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleBrokerRouter {
    target: BrokerId,
}

impl SingleBrokerRouter {
    /// Route everything to `target`.
    #[must_use]
    pub const fn new(target: BrokerId) -> Self {
        Self { target }
    }

    /// The fixed target.
    #[must_use]
    pub const fn target(&self) -> &BrokerId {
        &self.target
    }
}

impl RoutingPolicy for SingleBrokerRouter {
    fn route_order(&self, _candidates: &[BrokerId], _order: &Order) -> Result<BrokerId, RoutingError> {
        Ok(self.target.clone())
    }

    fn route_history(
        &self,
        _candidates: &[BrokerId],
        _request: &HistoryRequest,
    ) -> Result<BrokerId, RoutingError> {
        Ok(self.target.clone())
    }
}
