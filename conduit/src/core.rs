use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use conduit_core::{
    Broker, BrokerId, BrokerKind, Cash, CompositeConfig, ConduitError, EventHandler,
    HistoryRequest, HistoryStream, Holding, Order, merge_cash, merge_holdings,
};

use crate::fanout::fan_out;
use crate::routing::RoutingPolicy;

/// A broker that fronts several brokers as one.
///
/// Lifecycle and account reads fan out to every broker and merge the results.
/// Order operations and history requests go to exactly one broker, chosen by
/// the configured [`RoutingPolicy`]. Events from every broker are re-emitted
/// to the composite's subscribers.
pub struct CompositeBroker {
    pub(crate) brokers: Vec<Arc<dyn Broker>>,
    pub(crate) ids: Vec<BrokerId>,
    pub(crate) policy: Arc<dyn RoutingPolicy>,
    pub(crate) cfg: CompositeConfig,
    id: BrokerId,
    name: String,
}

/// Builder for constructing a [`CompositeBroker`].
pub struct CompositeBrokerBuilder {
    brokers: Vec<Arc<dyn Broker>>,
    policy: Option<Arc<dyn RoutingPolicy>>,
    cfg: CompositeConfig,
}

impl Default for CompositeBrokerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositeBrokerBuilder {
    /// Create an empty builder: no brokers, no policy, no fan-out timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            brokers: vec![],
            policy: None,
            cfg: CompositeConfig::default(),
        }
    }

    /// Register a broker.
    ///
    /// Registration order is the construction order: fan-out results and
    /// aggregated errors are reported in it.
    #[must_use]
    pub fn with_broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.brokers.push(broker);
        self
    }

    /// Set the policy that picks the broker for orders and history.
    #[must_use]
    pub fn routing_policy(mut self, policy: impl RoutingPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Set a shared routing policy.
    #[must_use]
    pub fn routing_policy_arc(mut self, policy: Arc<dyn RoutingPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Bound each broker call made during a fan-out.
    ///
    /// A broker that does not answer in time fails with `BrokerTimeout`; the
    /// other brokers are unaffected. Routed calls are never bounded.
    #[must_use]
    pub const fn fanout_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.fanout_timeout = Some(timeout);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub const fn config(mut self, cfg: CompositeConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Build the composite.
    ///
    /// # Errors
    /// Returns `InvalidArg` if no broker was registered, no routing policy was
    /// set, or two brokers share the same id.
    pub fn build(self) -> Result<CompositeBroker, ConduitError> {
        if self.brokers.is_empty() {
            return Err(ConduitError::InvalidArg(
                "no brokers registered; add at least one via with_broker(...)".to_string(),
            ));
        }
        let Some(policy) = self.policy else {
            return Err(ConduitError::InvalidArg(
                "no routing policy set; call routing_policy(...)".to_string(),
            ));
        };

        let ids: Vec<BrokerId> = self.brokers.iter().map(|b| b.id().clone()).collect();
        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if !seen.insert(id) {
                return Err(ConduitError::InvalidArg(format!(
                    "broker {id} registered more than once"
                )));
            }
        }

        let name = self
            .brokers
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(" | ");
        let account = ids
            .iter()
            .map(|id| id.account.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        Ok(CompositeBroker {
            brokers: self.brokers,
            ids,
            policy,
            cfg: self.cfg,
            id: BrokerId::new(BrokerKind::Default, account),
            name,
        })
    }
}

impl CompositeBroker {
    /// Start building a new composite.
    #[must_use]
    pub fn builder() -> CompositeBrokerBuilder {
        CompositeBrokerBuilder::new()
    }

    /// Brokers in construction order.
    #[must_use]
    pub fn brokers(&self) -> &[Arc<dyn Broker>] {
        &self.brokers
    }

    /// Broker ids in construction order; this is the list routing policies see.
    #[must_use]
    pub fn broker_ids(&self) -> &[BrokerId] {
        &self.ids
    }

    /// Look up a broker by id.
    #[must_use]
    pub fn broker(&self, id: &BrokerId) -> Option<&Arc<dyn Broker>> {
        self.ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|idx| &self.brokers[idx])
    }

    /// Resolve the broker that would handle `order`, without calling it.
    ///
    /// # Errors
    /// Returns `Routing` if the policy fails and `UnknownBroker` if it picks an
    /// id that is not part of this composite.
    pub fn route_order_target(&self, order: &Order) -> Result<BrokerId, ConduitError> {
        let id = self.policy.route_order(&self.ids, order)?;
        self.resolve(&id).map(|_| id)
    }

    /// Resolve the broker that would serve `request`, without calling it.
    ///
    /// # Errors
    /// Same as [`route_order_target`](Self::route_order_target).
    pub fn route_history_target(&self, request: &HistoryRequest) -> Result<BrokerId, ConduitError> {
        let id = self.policy.route_history(&self.ids, request)?;
        self.resolve(&id).map(|_| id)
    }

    fn resolve(&self, id: &BrokerId) -> Result<&Arc<dyn Broker>, ConduitError> {
        self.broker(id)
            .ok_or_else(|| ConduitError::UnknownBroker { id: id.clone() })
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "conduit::core::order_target",
            skip_all,
            fields(order_id = order.id, symbol = %order.symbol),
        )
    )]
    fn order_target(&self, order: &Order) -> Result<&Arc<dyn Broker>, ConduitError> {
        let id = self.policy.route_order(&self.ids, order)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(target_broker = %id, "routed order");
        self.resolve(&id)
    }

    fn timeout(&self) -> Option<Duration> {
        self.cfg.fanout_timeout
    }
}

#[async_trait]
impl Broker for CompositeBroker {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &BrokerId {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.brokers.iter().all(|b| b.is_connected())
    }

    fn account_instantly_updated(&self) -> bool {
        self.brokers.iter().all(|b| b.account_instantly_updated())
    }

    async fn connect(&self) -> Result<(), ConduitError> {
        fan_out(&self.brokers, "connect", self.timeout(), |b| async move {
            b.connect().await
        })
        .await
        .map(|_| ())
    }

    async fn disconnect(&self) -> Result<(), ConduitError> {
        fan_out(&self.brokers, "disconnect", self.timeout(), |b| async move {
            b.disconnect().await
        })
        .await
        .map(|_| ())
    }

    async fn place_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_target(order)?.place_order(order).await
    }

    async fn update_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_target(order)?.update_order(order).await
    }

    async fn cancel_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_target(order)?.cancel_order(order).await
    }

    async fn open_orders(&self) -> Result<Vec<Order>, ConduitError> {
        let per_broker = fan_out(&self.brokers, "open_orders", self.timeout(), |b| async move {
            b.open_orders().await
        })
        .await?;
        Ok(per_broker.into_iter().flatten().collect())
    }

    async fn holdings(&self) -> Result<Vec<Holding>, ConduitError> {
        let per_broker = fan_out(&self.brokers, "holdings", self.timeout(), |b| async move {
            b.holdings().await
        })
        .await?;
        Ok(merge_holdings(per_broker.into_iter().flatten()))
    }

    async fn cash_balance(&self) -> Result<Vec<Cash>, ConduitError> {
        let per_broker = fan_out(&self.brokers, "cash_balance", self.timeout(), |b| async move {
            b.cash_balance().await
        })
        .await?;
        Ok(merge_cash(per_broker.into_iter().flatten()))
    }

    async fn history(&self, request: &HistoryRequest) -> Result<HistoryStream, ConduitError> {
        let id = self.policy.route_history(&self.ids, request)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(target_broker = %id, symbol = %request.symbol, "routed history request");
        self.resolve(&id)?.history(request).await
    }

    fn subscribe(&self, handler: EventHandler) {
        for b in &self.brokers {
            b.subscribe(handler.clone());
        }
    }

    fn unsubscribe(&self, handler: &EventHandler) -> bool {
        self.brokers
            .iter()
            .fold(false, |removed, b| b.unsubscribe(handler) || removed)
    }
}
