use std::sync::Arc;
use std::time::Duration;

use conduit::{CompositeBroker, ResetSupervisor, SecurityTypeRouter};
use conduit_core::{
    Broker, BrokerEvent, BrokerId, BrokerKind, Cash, EventHandler, Holding, Order, OrderDirection,
    OrderEvent, OrderStatus, ResetConfig, RoutingTable, SecurityType, Symbol,
};
use conduit_mock::{DynamicMockBroker, MockBehavior};
use rust_decimal::Decimal;
use tracing_subscriber::fmt::format::FmtSpan;

fn spy_holding(quantity: i64, price: i64) -> Holding {
    Holding {
        symbol: Symbol::equity("SPY"),
        security_type: SecurityType::Equity,
        currency_symbol: "USD".into(),
        quantity: Decimal::from(quantity),
        average_price: Decimal::from(price),
        market_price: Decimal::from(price),
        market_value: Decimal::from(quantity * price),
        conversion_rate: Decimal::ONE,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,conduit=trace (build with --features conduit/tracing for spans)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();

    // 1. Two mock accounts standing in for real gateways.
    let ib_id = BrokerId::new(BrokerKind::InteractiveBrokers, "U100");
    let fx_id = BrokerId::new(BrokerKind::Oanda, "fx-7");
    let (ib, ib_ctl) = DynamicMockBroker::new_with_controller(ib_id.clone());
    let (fx, fx_ctl) = DynamicMockBroker::new_with_controller(fx_id.clone());

    ib_ctl
        .set_holdings(MockBehavior::Return(vec![spy_holding(1, 2)]))
        .await;
    fx_ctl
        .set_holdings(MockBehavior::Return(vec![spy_holding(3, 4)]))
        .await;
    ib_ctl
        .set_cash(MockBehavior::Return(vec![Cash::new(
            "USD",
            Decimal::from(10_000),
            Decimal::ONE,
        )]))
        .await;

    // 2. Equities go to IB, forex to OANDA.
    let table = RoutingTable::new()
        .route(SecurityType::Equity, ib_id)
        .route(SecurityType::Forex, fx_id);
    let composite = CompositeBroker::builder()
        .with_broker(Arc::clone(&ib))
        .with_broker(fx)
        .routing_policy(SecurityTypeRouter::from_table(table))
        .fanout_timeout(Duration::from_secs(5))
        .build()?;

    composite.subscribe(EventHandler::on_order_status(|e| {
        println!("order {} -> {:?}", e.order_id, e.status);
    }));

    // 3. Fan-out lifecycle and account reads.
    composite.connect().await?;
    println!("{} connected: {}", composite.name(), composite.is_connected());
    for h in composite.holdings().await? {
        println!(
            "{}: qty {} avg {} value {}",
            h.symbol, h.quantity, h.average_price, h.market_value
        );
    }
    for c in composite.cash_balance().await? {
        println!("{}: {}", c.currency_symbol, c.amount);
    }

    // 4. Routed order and an event raised by the broker that took it.
    let order = Order::market(1, Symbol::equity("SPY"), Decimal::from(10));
    println!(
        "placing order via {}",
        composite.route_order_target(&order)?
    );
    composite.place_order(&order).await?;
    ib_ctl.emit(&BrokerEvent::OrderStatusChanged(OrderEvent {
        order_id: order.id,
        symbol: order.symbol.clone(),
        time: chrono::Utc::now(),
        status: OrderStatus::Filled,
        direction: OrderDirection::Buy,
        fill_price: Decimal::from(4),
        fill_quantity: order.quantity,
        order_fee: Decimal::ONE,
        message: String::new(),
    }));

    // 5. Supervised reset of the IB connection.
    let supervisor = ResetSupervisor::for_broker(ib, ResetConfig::default())?;
    supervisor.request_reset().await?;
    println!(
        "reset ok: {} ({} completed)",
        supervisor.was_last_reset_successful(),
        supervisor.completed_resets()
    );
    supervisor.shutdown().await?;

    composite.disconnect().await?;
    Ok(())
}
