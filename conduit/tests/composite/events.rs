use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use conduit_core::{
    AccountEvent, Broker, BrokerEvent, BrokerMessage, EventHandler, MessageKind, OrderDirection,
    OrderEvent, OrderStatus, SecurityType, Symbol,
};
use rust_decimal::Decimal;

use crate::helpers::{SPY, ib_and_oanda, ib_id, oanda_id};

fn fill(order_id: u64) -> BrokerEvent {
    BrokerEvent::OrderStatusChanged(OrderEvent {
        order_id,
        symbol: Symbol::equity(SPY),
        time: Utc::now(),
        status: OrderStatus::Filled,
        direction: OrderDirection::Buy,
        fill_price: Decimal::TEN,
        fill_quantity: Decimal::ONE,
        order_fee: Decimal::ZERO,
        message: String::new(),
    })
}

fn counting_handler(hits: &Arc<AtomicUsize>) -> EventHandler {
    let hits = Arc::clone(hits);
    EventHandler::on_order_status(move |_| {
        hits.fetch_add(1, Ordering::SeqCst);
    })
}

#[test]
fn events_from_every_broker_are_reemitted_unchanged() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    let seen: Arc<Mutex<Vec<BrokerMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    composite.subscribe(EventHandler::on_message(move |m| {
        sink.lock().unwrap().push(m.clone());
    }));

    let from_ib = BrokerMessage {
        broker: ib_id(),
        kind: MessageKind::Warning,
        code: "1100".into(),
        message: "connectivity lost".into(),
    };
    let from_fx = BrokerMessage {
        broker: oanda_id(),
        kind: MessageKind::Information,
        code: "0".into(),
        message: "ok".into(),
    };
    ib_ctl.emit(&BrokerEvent::Message(from_ib.clone()));
    fx_ctl.emit(&BrokerEvent::Message(from_fx.clone()));

    assert_eq!(*seen.lock().unwrap(), vec![from_ib, from_fx]);
}

#[test]
fn handler_only_sees_its_category() {
    let (composite, ib_ctl, _fx_ctl) = ib_and_oanda();
    let hits = Arc::new(AtomicUsize::new(0));
    composite.subscribe(counting_handler(&hits));

    ib_ctl.emit(&BrokerEvent::AccountChanged(AccountEvent {
        currency_symbol: "USD".into(),
        cash_balance: Decimal::ONE,
    }));
    ib_ctl.emit(&fill(1));

    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn option_assignment_reaches_only_assignment_handlers() {
    let (composite, _ib_ctl, fx_ctl) = ib_and_oanda();
    let assigned: Arc<Mutex<Vec<OrderEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&assigned);
    composite.subscribe(EventHandler::on_option_assigned(move |e| {
        sink.lock().unwrap().push(e.clone());
    }));
    let status_hits = Arc::new(AtomicUsize::new(0));
    composite.subscribe(counting_handler(&status_hits));

    let assignment = OrderEvent {
        order_id: 42,
        symbol: Symbol::new("SPY240621C00500000", SecurityType::Option),
        time: Utc::now(),
        status: OrderStatus::Filled,
        direction: OrderDirection::Sell,
        fill_price: Decimal::new(500, 0),
        fill_quantity: Decimal::from(-1),
        order_fee: Decimal::ZERO,
        message: "Option Assignment".into(),
    };
    fx_ctl.emit(&BrokerEvent::OptionPositionAssigned(assignment.clone()));

    assert_eq!(*assigned.lock().unwrap(), vec![assignment]);
    assert_eq!(status_hits.load(Ordering::SeqCst), 0);
}

#[test]
fn concurrent_emitters_deliver_each_event_exactly_once() {
    const PER_THREAD: usize = 250;
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    let hits = Arc::new(AtomicUsize::new(0));
    composite.subscribe(counting_handler(&hits));

    std::thread::scope(|s| {
        for ctl in [&ib_ctl, &fx_ctl, &ib_ctl, &fx_ctl] {
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    ctl.emit(&fill(i as u64));
                }
            });
        }
    });

    assert_eq!(hits.load(Ordering::SeqCst), 4 * PER_THREAD);
}

#[test]
fn unsubscribe_detaches_from_every_broker() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    let hits = Arc::new(AtomicUsize::new(0));
    let handler = counting_handler(&hits);
    composite.subscribe(handler.clone());
    assert_eq!(ib_ctl.subscriber_count(), 1);
    assert_eq!(fx_ctl.subscriber_count(), 1);

    assert!(composite.unsubscribe(&handler));
    assert!(!composite.unsubscribe(&handler));
    ib_ctl.emit(&fill(1));
    fx_ctl.emit(&fill(2));

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(ib_ctl.subscriber_count(), 0);
    assert_eq!(fx_ctl.subscriber_count(), 0);
}

#[test]
fn unsubscribe_succeeds_if_any_broker_had_the_handler() {
    let (composite, ib_ctl, _fx_ctl) = ib_and_oanda();
    let hits = Arc::new(AtomicUsize::new(0));
    let handler = counting_handler(&hits);
    composite
        .broker(&ib_id())
        .expect("ib")
        .subscribe(handler.clone());

    assert!(composite.unsubscribe(&handler));
    assert_eq!(ib_ctl.subscriber_count(), 0);
}
