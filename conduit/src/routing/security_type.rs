use std::collections::HashMap;

use conduit_core::{BrokerId, HistoryRequest, Order, RoutingError, RoutingTable, SecurityType};

use super::RoutingPolicy;

/// Routes by the instrument class of the order's or request's symbol.
///
/// The mapping is copied at construction; later changes to the caller's map
/// have no effect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityTypeRouter {
    routes: HashMap<SecurityType, BrokerId>,
}

impl SecurityTypeRouter {
    /// Build a router from an instrument-class to broker map.
    #[must_use]
    pub const fn new(routes: HashMap<SecurityType, BrokerId>) -> Self {
        Self { routes }
    }

    /// Build a router from a serializable [`RoutingTable`].
    #[must_use]
    pub fn from_table(table: RoutingTable) -> Self {
        Self::new(table.routes)
    }

    fn lookup(&self, security_type: SecurityType) -> Result<BrokerId, RoutingError> {
        self.routes
            .get(&security_type)
            .cloned()
            .ok_or(RoutingError::NoMapping { security_type })
    }
}

impl From<RoutingTable> for SecurityTypeRouter {
    fn from(table: RoutingTable) -> Self {
        Self::from_table(table)
    }
}

impl RoutingPolicy for SecurityTypeRouter {
    fn route_order(&self, _candidates: &[BrokerId], order: &Order) -> Result<BrokerId, RoutingError> {
        self.lookup(order.symbol.security_type)
    }

    fn route_history(
        &self,
        _candidates: &[BrokerId],
        request: &HistoryRequest,
    ) -> Result<BrokerId, RoutingError> {
        self.lookup(request.symbol.security_type)
    }
}
