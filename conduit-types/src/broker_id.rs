//! Broker identity types usable across crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Account label used by identities that do not belong to a real account.
pub const DEFAULT_ACCOUNT: &str = "default";

/// Family of a broker connection.
///
/// Routing policies that only know "which kind of broker" resolve the kind to
/// a concrete [`BrokerId`] against the set of loaded brokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BrokerKind {
    /// Synthetic kind used by composites and placeholder identities.
    Default,
    /// Simulated broker used when replaying history.
    Backtesting,
    /// Interactive Brokers gateway.
    InteractiveBrokers,
    /// FXCM.
    Fxcm,
    /// OANDA.
    Oanda,
    /// Tradier.
    Tradier,
    /// Bitfinex.
    Bitfinex,
    /// Coinbase / GDAX.
    Gdax,
    /// Alpaca.
    Alpaca,
}

impl BrokerKind {
    /// Stable, human-readable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Backtesting => "backtesting",
            Self::InteractiveBrokers => "interactive-brokers",
            Self::Fxcm => "fxcm",
            Self::Oanda => "oanda",
            Self::Tradier => "tradier",
            Self::Bitfinex => "bitfinex",
            Self::Gdax => "gdax",
            Self::Alpaca => "alpaca",
        }
    }
}

impl fmt::Display for BrokerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value identifying one broker connection: its kind plus the account it trades.
///
/// Two ids are equal when both the kind and the account match. Within one
/// composite broker every id must be distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BrokerId {
    /// Broker family.
    pub kind: BrokerKind,
    /// Account name or number at that broker.
    pub account: String,
}

impl BrokerId {
    /// Build an id from a kind and an account label.
    pub fn new(kind: BrokerKind, account: impl Into<String>) -> Self {
        Self {
            kind,
            account: account.into(),
        }
    }

    /// Placeholder id with the [`BrokerKind::Default`] kind and [`DEFAULT_ACCOUNT`].
    #[must_use]
    pub fn default_composite() -> Self {
        Self::new(BrokerKind::Default, DEFAULT_ACCOUNT)
    }

    /// Id of the simulated broker used when replaying history.
    #[must_use]
    pub fn backtesting() -> Self {
        Self::new(BrokerKind::Backtesting, DEFAULT_ACCOUNT)
    }
}

impl fmt::Display for BrokerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.account)
    }
}
