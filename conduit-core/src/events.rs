use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::types::{AccountEvent, BrokerEvent, BrokerMessage, OrderEvent};

/// Shared callback for one event category.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// A subscriber callback bound to one event category.
///
/// Handlers are compared by identity: two values are equal when they wrap the
/// same allocation, so a clone of a subscribed handler can be used to
/// unsubscribe it.
#[derive(Clone)]
pub enum EventHandler {
    /// Called for order status changes.
    OrderStatusChanged(Handler<OrderEvent>),
    /// Called when an option position is assigned.
    OptionPositionAssigned(Handler<OrderEvent>),
    /// Called when a cash balance changes.
    AccountChanged(Handler<AccountEvent>),
    /// Called for broker messages.
    Message(Handler<BrokerMessage>),
}

impl EventHandler {
    /// Wrap a closure as an order status handler.
    pub fn on_order_status(f: impl Fn(&OrderEvent) + Send + Sync + 'static) -> Self {
        Self::OrderStatusChanged(Arc::new(f))
    }

    /// Wrap a closure as an option assignment handler.
    pub fn on_option_assigned(f: impl Fn(&OrderEvent) + Send + Sync + 'static) -> Self {
        Self::OptionPositionAssigned(Arc::new(f))
    }

    /// Wrap a closure as an account change handler.
    pub fn on_account_changed(f: impl Fn(&AccountEvent) + Send + Sync + 'static) -> Self {
        Self::AccountChanged(Arc::new(f))
    }

    /// Wrap a closure as a broker message handler.
    pub fn on_message(f: impl Fn(&BrokerMessage) + Send + Sync + 'static) -> Self {
        Self::Message(Arc::new(f))
    }

    fn identity(&self) -> (u8, *const ()) {
        match self {
            Self::OrderStatusChanged(h) => (0, Arc::as_ptr(h).cast::<()>()),
            Self::OptionPositionAssigned(h) => (1, Arc::as_ptr(h).cast::<()>()),
            Self::AccountChanged(h) => (2, Arc::as_ptr(h).cast::<()>()),
            Self::Message(h) => (3, Arc::as_ptr(h).cast::<()>()),
        }
    }

    /// Invoke the handler if it listens to this event's category.
    pub fn dispatch(&self, event: &BrokerEvent) {
        match (self, event) {
            (Self::OrderStatusChanged(h), BrokerEvent::OrderStatusChanged(e))
            | (Self::OptionPositionAssigned(h), BrokerEvent::OptionPositionAssigned(e)) => h(e),
            (Self::AccountChanged(h), BrokerEvent::AccountChanged(e)) => h(e),
            (Self::Message(h), BrokerEvent::Message(e)) => h(e),
            _ => {}
        }
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for EventHandler {}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, ptr) = self.identity();
        let label = match kind {
            0 => "OrderStatusChanged",
            1 => "OptionPositionAssigned",
            2 => "AccountChanged",
            _ => "Message",
        };
        f.debug_tuple(label).field(&ptr).finish()
    }
}

/// Thread-safe list of subscribers, for brokers that publish events.
///
/// `emit` runs every matching handler synchronously on the calling thread.
/// Handlers may subscribe or unsubscribe from inside a callback; the change
/// applies to the next emission.
#[derive(Default)]
pub struct EventRegistry {
    handlers: RwLock<Vec<EventHandler>>,
}

impl EventRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler. The same handler may be added more than once.
    pub fn subscribe(&self, handler: EventHandler) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    /// Remove the most recently added registration of `handler`.
    pub fn unsubscribe(&self, handler: &EventHandler) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        match handlers.iter().rposition(|h| h == handler) {
            Some(idx) => {
                handlers.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Deliver `event` to every handler of its category.
    pub fn emit(&self, event: &BrokerEvent) {
        let snapshot = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for handler in &snapshot {
            handler.dispatch(event);
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}
