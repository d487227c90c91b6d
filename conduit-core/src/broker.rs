use async_trait::async_trait;

use crate::events::EventHandler;
use crate::types::{BrokerId, Cash, ConduitError, HistoryRequest, HistoryStream, Holding, Order};

/// A connection to one brokerage account.
///
/// Implementations own their transport and event source. The trait is
/// object-safe so orchestrators can hold `Arc<dyn Broker>` for any mix of
/// backends, and a composite of brokers is itself a `Broker`.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Human-readable name used in logs and error tags.
    fn name(&self) -> &str;

    /// Stable identity of this connection. Routing policies return these.
    fn id(&self) -> &BrokerId;

    /// Whether the connection is currently up.
    fn is_connected(&self) -> bool;

    /// Whether account state (cash, holdings) is pushed as soon as it changes.
    fn account_instantly_updated(&self) -> bool;

    /// Open the connection.
    async fn connect(&self) -> Result<(), ConduitError>;

    /// Close the connection.
    async fn disconnect(&self) -> Result<(), ConduitError>;

    /// Submit a new order. `Ok(false)` means the broker declined it without error.
    async fn place_order(&self, order: &Order) -> Result<bool, ConduitError>;

    /// Modify a working order.
    async fn update_order(&self, order: &Order) -> Result<bool, ConduitError>;

    /// Cancel a working order.
    async fn cancel_order(&self, order: &Order) -> Result<bool, ConduitError>;

    /// Orders currently working at the broker.
    async fn open_orders(&self) -> Result<Vec<Order>, ConduitError>;

    /// Current positions.
    async fn holdings(&self) -> Result<Vec<Holding>, ConduitError>;

    /// Current cash balances, one entry per currency.
    async fn cash_balance(&self) -> Result<Vec<Cash>, ConduitError>;

    /// Historical market data as a lazy stream.
    async fn history(&self, request: &HistoryRequest) -> Result<HistoryStream, ConduitError>;

    /// Register a handler for the events this broker publishes.
    fn subscribe(&self, handler: EventHandler);

    /// Remove a previously registered handler. Returns whether one was removed.
    fn unsubscribe(&self, handler: &EventHandler) -> bool;

    /// Advertise the reset capability by returning a usable trait object when supported.
    fn as_reset_provider(&self) -> Option<&dyn ResetProvider> {
        None
    }
}

/// Role trait for connections that can run a full reset sequence
/// (disconnect, re-authenticate, reconnect).
///
/// The supervisor guarantees at most one `reset` runs at a time per provider.
#[async_trait]
pub trait ResetProvider: Send + Sync {
    /// Run one reset sequence to completion.
    async fn reset(&self) -> Result<(), ConduitError>;
}
