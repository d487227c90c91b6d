use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use conduit_core::{
    Broker, BrokerEvent, BrokerId, Cash, ConduitError, EventHandler, EventRegistry,
    HistoryRequest, HistoryStream, Holding, MarketDataPoint, Order, ResetProvider,
};

/// Instruction for how a method should behave.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(ConduitError),
    /// Hang indefinitely (simulate a stalled broker).
    Hang,
    /// Panic with the provided message.
    Panic(&'static str),
}

/// Broker operations the mock records and can be scripted for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MockOp {
    /// `Broker::connect`.
    Connect,
    /// `Broker::disconnect`.
    Disconnect,
    /// `Broker::place_order`.
    PlaceOrder,
    /// `Broker::update_order`.
    UpdateOrder,
    /// `Broker::cancel_order`.
    CancelOrder,
    /// `Broker::open_orders`.
    OpenOrders,
    /// `Broker::holdings`.
    Holdings,
    /// `Broker::cash_balance`.
    CashBalance,
    /// `Broker::history`.
    History,
    /// `ResetProvider::reset`.
    Reset,
}

/// One entry of the mock's call log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockCall {
    /// Operation invoked.
    pub op: MockOp,
    /// Order id for order operations.
    pub order_id: Option<u64>,
}

#[derive(Default)]
struct InternalState {
    lifecycle_rules: HashMap<MockOp, MockBehavior<()>>,
    order_rules: HashMap<MockOp, MockBehavior<bool>>,
    open_orders: Option<MockBehavior<Vec<Order>>>,
    holdings: Option<MockBehavior<Vec<Holding>>>,
    cash: Option<MockBehavior<Vec<Cash>>>,
    history: Option<MockBehavior<Vec<MarketDataPoint>>>,
    delays: HashMap<MockOp, Duration>,
    calls: Vec<MockCall>,
}

struct Shared {
    state: Mutex<InternalState>,
    connected: AtomicBool,
    instant_updates: AtomicBool,
    events: EventRegistry,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    shared: Arc<Shared>,
}

impl DynamicMockController {
    /// Script `connect`, `disconnect` or `reset`. Other ops are ignored.
    pub async fn set_lifecycle_behavior(&self, op: MockOp, behavior: MockBehavior<()>) {
        let mut guard = self.shared.state.lock().await;
        guard.lifecycle_rules.insert(op, behavior);
    }

    /// Script `place_order`, `update_order` or `cancel_order`. Other ops are ignored.
    pub async fn set_order_behavior(&self, op: MockOp, behavior: MockBehavior<bool>) {
        let mut guard = self.shared.state.lock().await;
        guard.order_rules.insert(op, behavior);
    }

    /// Set the behavior for `open_orders`.
    pub async fn set_open_orders(&self, behavior: MockBehavior<Vec<Order>>) {
        self.shared.state.lock().await.open_orders = Some(behavior);
    }

    /// Set the behavior for `holdings`.
    pub async fn set_holdings(&self, behavior: MockBehavior<Vec<Holding>>) {
        self.shared.state.lock().await.holdings = Some(behavior);
    }

    /// Set the behavior for `cash_balance`.
    pub async fn set_cash(&self, behavior: MockBehavior<Vec<Cash>>) {
        self.shared.state.lock().await.cash = Some(behavior);
    }

    /// Set the points yielded by `history`.
    pub async fn set_history(&self, behavior: MockBehavior<Vec<MarketDataPoint>>) {
        self.shared.state.lock().await.history = Some(behavior);
    }

    /// Sleep for `delay` before answering `op`.
    pub async fn set_delay(&self, op: MockOp, delay: Duration) {
        self.shared.state.lock().await.delays.insert(op, delay);
    }

    /// Force the value reported by `is_connected`.
    pub fn set_connected(&self, connected: bool) {
        self.shared.connected.store(connected, Ordering::SeqCst);
    }

    /// Force the value reported by `account_instantly_updated`.
    pub fn set_instant_updates(&self, instant: bool) {
        self.shared.instant_updates.store(instant, Ordering::SeqCst);
    }

    /// Publish an event to every subscriber, synchronously on this thread.
    pub fn emit(&self, event: &BrokerEvent) {
        self.shared.events.emit(event);
    }

    /// Number of handlers currently subscribed to the mock.
    pub fn subscriber_count(&self) -> usize {
        self.shared.events.len()
    }

    /// Return a copy of the call log.
    pub async fn calls(&self) -> Vec<MockCall> {
        self.shared.state.lock().await.calls.clone()
    }

    /// Number of recorded calls for `op`.
    pub async fn call_count(&self, op: MockOp) -> usize {
        let guard = self.shared.state.lock().await;
        guard.calls.iter().filter(|c| c.op == op).count()
    }

    /// Clear all configured behaviors, delays and the call log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.shared.state.lock().await;
        *guard = InternalState::default();
    }
}

/// A broker that defers all behavior to an external controller.
///
/// Unscripted calls succeed with empty results; `connect` and `disconnect`
/// flip the connected flag when they succeed.
pub struct DynamicMockBroker {
    id: BrokerId,
    name: String,
    shared: Arc<Shared>,
}

impl DynamicMockBroker {
    /// Create a new dynamic mock broker and its controller.
    #[must_use]
    pub fn new_with_controller(id: BrokerId) -> (Arc<dyn Broker>, DynamicMockController) {
        let shared = Arc::new(Shared {
            state: Mutex::new(InternalState::default()),
            connected: AtomicBool::new(false),
            instant_updates: AtomicBool::new(true),
            events: EventRegistry::new(),
        });
        let controller = DynamicMockController {
            shared: Arc::clone(&shared),
        };
        let me = Arc::new(Self {
            name: format!("mock:{id}"),
            id,
            shared,
        });
        (me as Arc<dyn Broker>, controller)
    }

    // Log the call and sleep for any scripted delay, without holding the lock across the sleep.
    async fn enter(&self, op: MockOp, order_id: Option<u64>) {
        let delay = {
            let mut guard = self.shared.state.lock().await;
            guard.calls.push(MockCall { op, order_id });
            guard.delays.get(&op).copied()
        };
        if let Some(d) = delay {
            tokio::time::sleep(d).await;
        }
    }

    async fn resolve<T>(behavior: Option<MockBehavior<T>>, default: T) -> Result<T, ConduitError> {
        match behavior {
            None => Ok(default),
            Some(MockBehavior::Return(v)) => Ok(v),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            Some(MockBehavior::Panic(msg)) => panic!("{msg}"),
        }
    }

    async fn lifecycle(&self, op: MockOp) -> Result<(), ConduitError> {
        self.enter(op, None).await;
        let behavior = {
            let guard = self.shared.state.lock().await;
            guard.lifecycle_rules.get(&op).cloned()
        };
        Self::resolve(behavior, ()).await
    }

    async fn order_op(&self, op: MockOp, order: &Order) -> Result<bool, ConduitError> {
        self.enter(op, Some(order.id)).await;
        let behavior = {
            let guard = self.shared.state.lock().await;
            guard.order_rules.get(&op).cloned()
        };
        Self::resolve(behavior, true).await
    }
}

#[async_trait]
impl Broker for DynamicMockBroker {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> &BrokerId {
        &self.id
    }

    fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    fn account_instantly_updated(&self) -> bool {
        self.shared.instant_updates.load(Ordering::SeqCst)
    }

    async fn connect(&self) -> Result<(), ConduitError> {
        self.lifecycle(MockOp::Connect).await?;
        self.shared.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ConduitError> {
        self.lifecycle(MockOp::Disconnect).await?;
        self.shared.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn place_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_op(MockOp::PlaceOrder, order).await
    }

    async fn update_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_op(MockOp::UpdateOrder, order).await
    }

    async fn cancel_order(&self, order: &Order) -> Result<bool, ConduitError> {
        self.order_op(MockOp::CancelOrder, order).await
    }

    async fn open_orders(&self) -> Result<Vec<Order>, ConduitError> {
        self.enter(MockOp::OpenOrders, None).await;
        let behavior = self.shared.state.lock().await.open_orders.clone();
        Self::resolve(behavior, Vec::new()).await
    }

    async fn holdings(&self) -> Result<Vec<Holding>, ConduitError> {
        self.enter(MockOp::Holdings, None).await;
        let behavior = self.shared.state.lock().await.holdings.clone();
        Self::resolve(behavior, Vec::new()).await
    }

    async fn cash_balance(&self) -> Result<Vec<Cash>, ConduitError> {
        self.enter(MockOp::CashBalance, None).await;
        let behavior = self.shared.state.lock().await.cash.clone();
        Self::resolve(behavior, Vec::new()).await
    }

    async fn history(&self, _request: &HistoryRequest) -> Result<HistoryStream, ConduitError> {
        self.enter(MockOp::History, None).await;
        let behavior = self.shared.state.lock().await.history.clone();
        let points = Self::resolve(behavior, Vec::new()).await?;
        Ok(Box::pin(futures::stream::iter(points)))
    }

    fn subscribe(&self, handler: EventHandler) {
        self.shared.events.subscribe(handler);
    }

    fn unsubscribe(&self, handler: &EventHandler) -> bool {
        self.shared.events.unsubscribe(handler)
    }

    fn as_reset_provider(&self) -> Option<&dyn ResetProvider> {
        Some(self as &dyn ResetProvider)
    }
}

#[async_trait]
impl ResetProvider for DynamicMockBroker {
    async fn reset(&self) -> Result<(), ConduitError> {
        self.lifecycle(MockOp::Reset).await
    }
}
