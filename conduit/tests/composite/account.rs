use conduit_core::{Broker, ConduitError};
use rust_decimal::Decimal;
use conduit_mock::{MockBehavior, MockOp};

use crate::helpers::{cash, d, equity_order, forex_order, holding, ib_and_oanda};

#[tokio::test]
async fn open_orders_concatenate_in_construction_order() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_open_orders(MockBehavior::Return(vec![equity_order(1), equity_order(2)]))
        .await;
    fx_ctl
        .set_open_orders(MockBehavior::Return(vec![forex_order(3)]))
        .await;

    let orders = composite.open_orders().await.expect("orders");
    let ids: Vec<u64> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn open_orders_are_not_deduplicated() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_open_orders(MockBehavior::Return(vec![equity_order(9)]))
        .await;
    fx_ctl
        .set_open_orders(MockBehavior::Return(vec![equity_order(9)]))
        .await;

    assert_eq!(composite.open_orders().await.expect("orders").len(), 2);
}

#[tokio::test]
async fn holdings_merge_across_brokers() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_holdings(MockBehavior::Return(vec![holding("SPY", 1, 2), holding("QQQ", 5, 10)]))
        .await;
    fx_ctl
        .set_holdings(MockBehavior::Return(vec![holding("SPY", 3, 4)]))
        .await;

    let merged = composite.holdings().await.expect("holdings");

    assert_eq!(merged.len(), 2);
    let spy = &merged[0];
    assert_eq!(spy.symbol.value, "SPY");
    assert_eq!(spy.quantity, d(4));
    assert_eq!(spy.average_price, Decimal::new(35, 1));
    assert_eq!(spy.market_value, d(14));
    assert_eq!(merged[1].symbol.value, "QQQ");
    assert_eq!(merged[1].quantity, d(5));
}

#[tokio::test]
async fn cash_merges_per_currency() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_cash(MockBehavior::Return(vec![cash("USD", 1, 2)]))
        .await;
    fx_ctl
        .set_cash(MockBehavior::Return(vec![cash("USD", 3, 4), cash("EUR", 10, 1)]))
        .await;

    let merged = composite.cash_balance().await.expect("cash");

    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].currency_symbol, "USD");
    assert_eq!(merged[0].amount, d(4));
    assert_eq!(merged[0].conversion_rate, Decimal::new(35, 1));
    assert_eq!(merged[1], cash("EUR", 10, 1));
}

#[tokio::test]
async fn failing_read_returns_no_partial_result() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_holdings(MockBehavior::Return(vec![holding("SPY", 1, 2)]))
        .await;
    fx_ctl
        .set_holdings(MockBehavior::Fail(ConduitError::broker("oanda", "rate limited")))
        .await;

    let err = composite.holdings().await.expect_err("must fail");
    assert_eq!(err, ConduitError::broker("oanda", "rate limited"));
    assert_eq!(ib_ctl.call_count(MockOp::Holdings).await, 1);
}

#[tokio::test]
async fn aggregates_are_recomputed_on_every_call() {
    let (composite, ib_ctl, _fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_cash(MockBehavior::Return(vec![cash("USD", 5, 1)]))
        .await;
    assert_eq!(composite.cash_balance().await.expect("cash")[0].amount, d(5));

    ib_ctl
        .set_cash(MockBehavior::Return(vec![cash("USD", 8, 1)]))
        .await;
    assert_eq!(composite.cash_balance().await.expect("cash")[0].amount, d(8));
}
