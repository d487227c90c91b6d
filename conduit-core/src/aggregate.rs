//! Merge per-broker account snapshots into one view.
//!
//! Both helpers group entries by key in first-appearance order, so callers
//! that feed brokers in construction order get a deterministic result.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::types::{Cash, Holding, Symbol};

struct HoldingAcc {
    first: Holding,
    quantity: Decimal,
    market_value: Decimal,
    // None once a weighted sum leaves Decimal's range.
    average_price_w: Option<Decimal>,
    market_price_w: Option<Decimal>,
    conversion_rate_w: Option<Decimal>,
}

fn add_weighted(acc: Option<Decimal>, value: Decimal, weight: Decimal) -> Option<Decimal> {
    acc?.checked_add(value.checked_mul(weight)?)
}

fn weighted_mean(sum: Option<Decimal>, total: Decimal) -> Option<Decimal> {
    if total.is_zero() {
        return None;
    }
    sum?.checked_div(total)
}

impl HoldingAcc {
    fn new(h: Holding) -> Self {
        let mut acc = Self {
            quantity: Decimal::ZERO,
            market_value: Decimal::ZERO,
            average_price_w: Some(Decimal::ZERO),
            market_price_w: Some(Decimal::ZERO),
            conversion_rate_w: Some(Decimal::ZERO),
            first: h.clone(),
        };
        acc.add(&h);
        acc
    }

    fn add(&mut self, h: &Holding) {
        self.quantity = self.quantity.saturating_add(h.quantity);
        self.market_value = self.market_value.saturating_add(h.market_value);
        self.average_price_w = add_weighted(self.average_price_w, h.average_price, h.quantity);
        self.market_price_w = add_weighted(self.market_price_w, h.market_price, h.quantity);
        self.conversion_rate_w = add_weighted(self.conversion_rate_w, h.conversion_rate, h.quantity);
    }

    fn finish(self) -> Holding {
        let mut out = self.first;
        out.quantity = self.quantity;
        out.market_value = self.market_value;
        let means = (
            weighted_mean(self.average_price_w, self.quantity),
            weighted_mean(self.market_price_w, self.quantity),
            weighted_mean(self.conversion_rate_w, self.quantity),
        );
        if let (Some(average), Some(market), Some(rate)) = means {
            out.average_price = average;
            out.market_price = market;
            out.conversion_rate = rate;
        } else {
            #[cfg(feature = "tracing")]
            tracing::debug!(symbol = %out.symbol, quantity = %out.quantity, "no usable weight; keeping first prices");
        }
        out
    }
}

/// Combine holdings reported by several brokers into one entry per symbol.
///
/// Quantities and market values are summed; average price, market price and
/// conversion rate are quantity-weighted. When the summed quantity is zero,
/// or a weighted sum does not fit in a `Decimal`, the first contributor's
/// prices are kept. Sums outside `Decimal`'s range saturate.
#[must_use]
pub fn merge_holdings(holdings: impl IntoIterator<Item = Holding>) -> Vec<Holding> {
    let mut index: HashMap<Symbol, usize> = HashMap::new();
    let mut groups: Vec<HoldingAcc> = Vec::new();
    for h in holdings {
        if let Some(&i) = index.get(&h.symbol) {
            groups[i].add(&h);
        } else {
            index.insert(h.symbol.clone(), groups.len());
            groups.push(HoldingAcc::new(h));
        }
    }
    groups.into_iter().map(HoldingAcc::finish).collect()
}

/// Combine cash balances reported by several brokers into one entry per currency.
///
/// Amounts are summed and the conversion rate is amount-weighted. When the
/// summed amount is zero, or the weighted sum does not fit in a `Decimal`,
/// the first contributor's rate is kept. Amounts outside `Decimal`'s range
/// saturate.
#[must_use]
pub fn merge_cash(balances: impl IntoIterator<Item = Cash>) -> Vec<Cash> {
    let mut index: HashMap<String, usize> = HashMap::new();
    // (first entry, summed amount, amount-weighted rate sum)
    let mut groups: Vec<(Cash, Decimal, Option<Decimal>)> = Vec::new();
    for c in balances {
        if let Some(&i) = index.get(&c.currency_symbol) {
            let g = &mut groups[i];
            g.1 = g.1.saturating_add(c.amount);
            g.2 = add_weighted(g.2, c.conversion_rate, c.amount);
        } else {
            index.insert(c.currency_symbol.clone(), groups.len());
            let amount = c.amount;
            let weighted = c.conversion_rate.checked_mul(amount);
            groups.push((c, amount, weighted));
        }
    }
    groups
        .into_iter()
        .map(|(mut first, amount, weighted)| {
            match weighted_mean(weighted, amount) {
                Some(rate) => first.conversion_rate = rate,
                None => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(currency = %first.currency_symbol, amount = %amount, "no usable weight; keeping first rate");
                }
            }
            first.amount = amount;
            first
        })
        .collect()
}
