//! Domain types exchanged with brokers, plus re-exports from `conduit-types`.

use std::fmt;

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use conduit_types::{
    BrokerId, BrokerKind, CompositeConfig, ConduitError, DEFAULT_ACCOUNT, ResetConfig,
    RoutingError, RoutingTable, SecurityType,
};

/// Ticker plus the instrument class it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// Ticker as understood by the brokers (e.g. "SPY", "EURUSD").
    pub value: String,
    /// Instrument class; drives per-class routing.
    pub security_type: SecurityType,
}

impl Symbol {
    /// Build a symbol of the given class.
    pub fn new(value: impl Into<String>, security_type: SecurityType) -> Self {
        Self {
            value: value.into(),
            security_type,
        }
    }

    /// Shorthand for an equity symbol.
    pub fn equity(value: impl Into<String>) -> Self {
        Self::new(value, SecurityType::Equity)
    }

    /// Shorthand for a forex pair.
    pub fn forex(value: impl Into<String>) -> Self {
        Self::new(value, SecurityType::Forex)
    }

    /// Shorthand for a crypto asset.
    pub fn crypto(value: impl Into<String>) -> Self {
        Self::new(value, SecurityType::Crypto)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Execution style of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum OrderType {
    /// Fill at the prevailing price.
    Market,
    /// Fill at `limit_price` or better.
    Limit,
    /// Becomes a market order once `stop_price` trades.
    StopMarket,
    /// Becomes a limit order once `stop_price` trades.
    StopLimit,
}

/// Order as submitted by the client. Brokers treat it as opaque apart from
/// the fields they need; the composite only reads `symbol` (through the policy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Client-side order id.
    pub id: u64,
    /// Instrument being traded.
    pub symbol: Symbol,
    /// Execution style.
    pub order_type: OrderType,
    /// Signed quantity; negative sells.
    pub quantity: Decimal,
    /// Limit price for `Limit`/`StopLimit`.
    pub limit_price: Option<Decimal>,
    /// Trigger price for `StopMarket`/`StopLimit`.
    pub stop_price: Option<Decimal>,
    /// Creation time.
    pub time: DateTime<Utc>,
    /// Free-form tag.
    pub tag: String,
}

impl Order {
    /// Market order for `quantity` units of `symbol`, created now.
    #[must_use]
    pub fn market(id: u64, symbol: Symbol, quantity: Decimal) -> Self {
        Self {
            id,
            symbol,
            order_type: OrderType::Market,
            quantity,
            limit_price: None,
            stop_price: None,
            time: Utc::now(),
            tag: String::new(),
        }
    }

    /// Limit order for `quantity` units of `symbol` at `limit_price`, created now.
    #[must_use]
    pub fn limit(id: u64, symbol: Symbol, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            order_type: OrderType::Limit,
            limit_price: Some(limit_price),
            ..Self::market(id, symbol, quantity)
        }
    }

    /// Stop-market order triggering at `stop_price`, created now.
    #[must_use]
    pub fn stop_market(id: u64, symbol: Symbol, quantity: Decimal, stop_price: Decimal) -> Self {
        Self {
            order_type: OrderType::StopMarket,
            stop_price: Some(stop_price),
            ..Self::market(id, symbol, quantity)
        }
    }
}

/// Bar width of a history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Individual ticks.
    Tick,
    /// One-second bars.
    Second,
    /// One-minute bars.
    Minute,
    /// Hourly bars.
    Hour,
    /// Daily bars.
    Daily,
}

/// Historical data request routed to a single broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRequest {
    /// Instrument whose history is requested.
    pub symbol: Symbol,
    /// Inclusive start.
    pub start: DateTime<Utc>,
    /// Exclusive end.
    pub end: DateTime<Utc>,
    /// Bar width.
    pub resolution: Resolution,
}

impl HistoryRequest {
    /// Build a request for `[start, end)` at `resolution`.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        resolution: Resolution,
    ) -> Self {
        Self {
            symbol,
            start,
            end,
            resolution,
        }
    }
}

/// One point of historical market data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDataPoint {
    /// Instrument the point belongs to.
    pub symbol: Symbol,
    /// Start time of the point.
    pub time: DateTime<Utc>,
    /// Price (close for bars, last for ticks).
    pub value: Decimal,
    /// Traded volume, when the broker reports it.
    pub volume: Option<Decimal>,
}

/// Lazy, finite history sequence. Every `history` call yields a fresh stream.
pub type HistoryStream = BoxStream<'static, MarketDataPoint>;

/// Per-instrument position snapshot reported by one broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Instrument held.
    pub symbol: Symbol,
    /// Instrument class as reported by the broker.
    pub security_type: SecurityType,
    /// Quote currency of the prices below.
    pub currency_symbol: String,
    /// Signed position size.
    pub quantity: Decimal,
    /// Average entry price.
    pub average_price: Decimal,
    /// Last market price.
    pub market_price: Decimal,
    /// Position value in quote currency.
    pub market_value: Decimal,
    /// Quote currency to account currency rate.
    pub conversion_rate: Decimal,
}

/// Balance of one currency reported by one broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cash {
    /// Currency code, e.g. "USD".
    pub currency_symbol: String,
    /// Balance in that currency.
    pub amount: Decimal,
    /// Currency to account currency rate.
    pub conversion_rate: Decimal,
}

impl Cash {
    /// Build a balance entry.
    pub fn new(currency_symbol: impl Into<String>, amount: Decimal, conversion_rate: Decimal) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
            amount,
            conversion_rate,
        }
    }
}

/// Lifecycle state carried by an [`OrderEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum OrderStatus {
    /// Accepted locally, not yet at the broker.
    New,
    /// Acknowledged by the broker.
    Submitted,
    /// Partially executed.
    PartiallyFilled,
    /// Fully executed.
    Filled,
    /// Cancel requested, not confirmed.
    CancelPending,
    /// Cancelled.
    Canceled,
    /// Rejected by the broker.
    Invalid,
}

/// Side of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Buy side.
    Buy,
    /// Sell side.
    Sell,
    /// No direction (e.g. cancellations).
    Hold,
}

/// Order status change or option assignment reported by a broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Client-side order id.
    pub order_id: u64,
    /// Instrument of the order.
    pub symbol: Symbol,
    /// Broker time of the event.
    pub time: DateTime<Utc>,
    /// New order status.
    pub status: OrderStatus,
    /// Fill side.
    pub direction: OrderDirection,
    /// Fill price, zero when nothing filled.
    pub fill_price: Decimal,
    /// Filled quantity, zero when nothing filled.
    pub fill_quantity: Decimal,
    /// Fee charged for this event.
    pub order_fee: Decimal,
    /// Optional broker message.
    pub message: String,
}

/// Change of a cash balance at a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEvent {
    /// Currency whose balance changed.
    pub currency_symbol: String,
    /// New balance.
    pub cash_balance: Decimal,
}

/// Severity of a [`BrokerMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Informational.
    Information,
    /// Something degraded but trading continues.
    Warning,
    /// The broker reported an error.
    Error,
    /// The connection was re-established.
    Reconnect,
    /// The connection was lost.
    Disconnect,
}

/// Free-form message from a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerMessage {
    /// Broker that produced the message.
    pub broker: BrokerId,
    /// Severity.
    pub kind: MessageKind,
    /// Broker-specific code.
    pub code: String,
    /// Message text.
    pub message: String,
}

/// Any event a broker can publish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BrokerEvent {
    /// An order changed status (fills, cancels, rejections).
    OrderStatusChanged(OrderEvent),
    /// A short option position was assigned.
    OptionPositionAssigned(OrderEvent),
    /// A cash balance changed.
    AccountChanged(AccountEvent),
    /// The broker sent a message.
    Message(BrokerMessage),
}
