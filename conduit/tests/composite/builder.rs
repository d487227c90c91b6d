use conduit::{CompositeBroker, SingleBrokerRouter};
use conduit_core::{Broker, BrokerId, BrokerKind, ConduitError};

use crate::helpers::{class_router, ib_id, mock, oanda_id};

#[test]
fn build_requires_brokers() {
    let err = CompositeBroker::builder()
        .routing_policy(class_router())
        .build()
        .err()
        .expect("no brokers must fail");
    assert!(matches!(err, ConduitError::InvalidArg(_)));
}

#[test]
fn build_requires_policy() {
    let (ib, _) = mock(ib_id());
    let err = CompositeBroker::builder()
        .with_broker(ib)
        .build()
        .err()
        .expect("no policy must fail");
    assert!(matches!(err, ConduitError::InvalidArg(msg) if msg.contains("routing policy")));
}

#[test]
fn build_rejects_duplicate_ids() {
    let (a, _) = mock(ib_id());
    let (b, _) = mock(ib_id());
    let err = CompositeBroker::builder()
        .with_broker(a)
        .with_broker(b)
        .routing_policy(SingleBrokerRouter::new(ib_id()))
        .build()
        .err()
        .expect("duplicate ids must fail");
    assert!(matches!(err, ConduitError::InvalidArg(msg) if msg.contains("more than once")));
}

#[test]
fn same_kind_different_accounts_are_distinct() {
    let (a, _) = mock(BrokerId::new(BrokerKind::InteractiveBrokers, "U1"));
    let (b, _) = mock(BrokerId::new(BrokerKind::InteractiveBrokers, "U2"));
    let composite = CompositeBroker::builder()
        .with_broker(a)
        .with_broker(b)
        .routing_policy(SingleBrokerRouter::new(ib_id()))
        .build()
        .expect("distinct accounts");
    assert_eq!(composite.broker_ids().len(), 2);
}

#[test]
fn composite_identity_and_name_join_children() {
    let (ib, _) = mock(ib_id());
    let (fx, _) = mock(oanda_id());
    let composite = crate::helpers::composite(&[ib, fx], class_router());

    assert_eq!(composite.id().kind, BrokerKind::Default);
    assert_eq!(composite.id().account, "U100; fx-7");
    assert_eq!(
        composite.name(),
        "mock:interactive-brokers/U100 | mock:oanda/fx-7"
    );
    assert_eq!(composite.broker_ids(), &[ib_id(), oanda_id()]);
    assert!(composite.broker(&oanda_id()).is_some());
    assert!(composite.broker(&BrokerId::backtesting()).is_none());
}
