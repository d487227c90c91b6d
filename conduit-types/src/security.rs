use std::fmt;

use serde::{Deserialize, Serialize};

/// Instrument class of a symbol. Used by [`RoutingTable`](crate::RoutingTable)
/// to pick a broker per class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SecurityType {
    /// Custom or untyped data.
    Base,
    /// Listed stock.
    Equity,
    /// Listed option contract.
    Option,
    /// Physical commodity.
    Commodity,
    /// Currency pair.
    Forex,
    /// Futures contract.
    Future,
    /// Contract for difference.
    Cfd,
    /// Crypto asset.
    Crypto,
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Base => "base",
            Self::Equity => "equity",
            Self::Option => "option",
            Self::Commodity => "commodity",
            Self::Forex => "forex",
            Self::Future => "future",
            Self::Cfd => "cfd",
            Self::Crypto => "crypto",
        };
        f.write_str(s)
    }
}
