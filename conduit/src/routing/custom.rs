use conduit_core::{BrokerId, BrokerKind, HistoryRequest, Order, RoutingError};

use super::RoutingPolicy;

/// Caller-supplied rule that names the broker family for an operation.
pub trait BrokerClassifier: Send + Sync {
    /// Broker family that should handle `order`.
    fn classify_order(&self, order: &Order) -> BrokerKind;

    /// Broker family that should serve `request`.
    fn classify_history(&self, request: &HistoryRequest) -> BrokerKind;
}

/// [`BrokerClassifier`] backed by two closures.
pub struct FnClassifier<O, H> {
    order: O,
    history: H,
}

impl<O, H> FnClassifier<O, H>
where
    O: Fn(&Order) -> BrokerKind + Send + Sync,
    H: Fn(&HistoryRequest) -> BrokerKind + Send + Sync,
{
    /// Wrap the two classification closures.
    pub const fn new(order: O, history: H) -> Self {
        Self { order, history }
    }
}

impl<O, H> BrokerClassifier for FnClassifier<O, H>
where
    O: Fn(&Order) -> BrokerKind + Send + Sync,
    H: Fn(&HistoryRequest) -> BrokerKind + Send + Sync,
{
    fn classify_order(&self, order: &Order) -> BrokerKind {
        (self.order)(order)
    }

    fn classify_history(&self, request: &HistoryRequest) -> BrokerKind {
        (self.history)(request)
    }
}

/// Routes with a caller-defined classifier, then resolves the returned
/// family to the one loaded broker of that kind.
pub struct CustomRouter<C> {
    loaded: Vec<BrokerId>,
    classifier: C,
}

impl<C: BrokerClassifier> CustomRouter<C> {
    /// Build a router over the brokers in `loaded`.
    pub fn new(loaded: impl IntoIterator<Item = BrokerId>, classifier: C) -> Self {
        Self {
            loaded: loaded.into_iter().collect(),
            classifier,
        }
    }

    /// Brokers this router resolves against.
    #[must_use]
    pub fn loaded(&self) -> &[BrokerId] {
        &self.loaded
    }

    fn resolve(&self, kind: BrokerKind) -> Result<BrokerId, RoutingError> {
        let mut matches = self.loaded.iter().filter(|id| id.kind == kind);
        match (matches.next(), matches.count()) {
            (None, _) => Err(RoutingError::BrokerNotLoaded { kind }),
            (Some(id), 0) => Ok(id.clone()),
            (Some(_), rest) => Err(RoutingError::AmbiguousBroker {
                kind,
                count: rest + 1,
            }),
        }
    }
}

impl<C: BrokerClassifier> RoutingPolicy for CustomRouter<C> {
    fn route_order(&self, _candidates: &[BrokerId], order: &Order) -> Result<BrokerId, RoutingError> {
        self.resolve(self.classifier.classify_order(order))
    }

    fn route_history(
        &self,
        _candidates: &[BrokerId],
        request: &HistoryRequest,
    ) -> Result<BrokerId, RoutingError> {
        self.resolve(self.classifier.classify_history(request))
    }
}
