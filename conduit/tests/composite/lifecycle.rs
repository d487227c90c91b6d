use std::time::Duration;

use conduit::CompositeBroker;
use conduit_core::{Broker, ConduitError};
use conduit_mock::{MockBehavior, MockOp};

use crate::helpers::{class_router, ib_and_oanda, ib_id, mock, oanda_id};

#[tokio::test(start_paused = true)]
async fn connect_runs_brokers_concurrently() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_delay(MockOp::Connect, Duration::from_millis(400))
        .await;
    fx_ctl
        .set_delay(MockOp::Connect, Duration::from_millis(300))
        .await;

    let start = tokio::time::Instant::now();
    composite.connect().await.expect("connect");
    let elapsed = start.elapsed();

    assert!(elapsed >= Duration::from_millis(400), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(700), "{elapsed:?}");
    assert!(composite.is_connected());
}

#[tokio::test]
async fn one_failure_does_not_stop_the_others() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_lifecycle_behavior(
            MockOp::Connect,
            MockBehavior::Fail(ConduitError::Other("gateway down".into())),
        )
        .await;

    let err = composite.connect().await.expect_err("ib fails");

    assert_eq!(
        err,
        ConduitError::broker("mock:interactive-brokers/U100", "unknown error: gateway down")
    );
    assert_eq!(fx_ctl.call_count(MockOp::Connect).await, 1);
    assert!(composite.broker(&oanda_id()).expect("oanda").is_connected());
    assert!(!composite.is_connected());
}

#[tokio::test]
async fn several_failures_are_all_reported() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    for ctl in [&ib_ctl, &fx_ctl] {
        ctl.set_lifecycle_behavior(
            MockOp::Disconnect,
            MockBehavior::Fail(ConduitError::broker("x", "nope")),
        )
        .await;
    }

    match composite.disconnect().await {
        Err(ConduitError::BrokersFailed { operation, errors }) => {
            assert_eq!(operation, "disconnect");
            assert_eq!(errors.len(), 2);
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn fanout_timeout_bounds_a_stalled_broker() {
    let (ib, ib_ctl) = mock(ib_id());
    let (fx, fx_ctl) = mock(oanda_id());
    let composite = CompositeBroker::builder()
        .with_broker(ib)
        .with_broker(fx)
        .routing_policy(class_router())
        .fanout_timeout(Duration::from_secs(2))
        .build()
        .expect("composite");
    ib_ctl.set_lifecycle_behavior(MockOp::Connect, MockBehavior::Hang).await;

    let err = composite.connect().await.expect_err("ib stalls");

    assert_eq!(
        err,
        ConduitError::broker_timeout("mock:interactive-brokers/U100", "connect")
    );
    assert_eq!(fx_ctl.call_count(MockOp::Connect).await, 1);
}

#[tokio::test]
async fn connected_and_instant_flags_are_anded() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl.set_connected(true);
    fx_ctl.set_connected(true);
    assert!(composite.is_connected());
    assert!(composite.account_instantly_updated());

    fx_ctl.set_connected(false);
    ib_ctl.set_instant_updates(false);
    assert!(!composite.is_connected());
    assert!(!composite.account_instantly_updated());
}

#[tokio::test]
async fn disconnect_reaches_every_broker() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    composite.connect().await.expect("connect");
    composite.disconnect().await.expect("disconnect");

    assert_eq!(ib_ctl.call_count(MockOp::Disconnect).await, 1);
    assert_eq!(fx_ctl.call_count(MockOp::Disconnect).await, 1);
    assert!(!composite.is_connected());
}

#[tokio::test(start_paused = true)]
async fn panicking_broker_does_not_cancel_the_others() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    ib_ctl
        .set_lifecycle_behavior(MockOp::Connect, MockBehavior::Panic("gateway crashed"))
        .await;
    fx_ctl
        .set_delay(MockOp::Connect, Duration::from_millis(50))
        .await;

    let err = composite.connect().await.expect_err("ib panics");

    assert_eq!(
        err,
        ConduitError::broker(
            "mock:interactive-brokers/U100",
            "connect panicked: gateway crashed"
        )
    );
    assert!(composite.broker(&oanda_id()).expect("oanda").is_connected());
    assert!(!composite.broker(&ib_id()).expect("ib").is_connected());
}

#[tokio::test]
async fn panicking_read_fails_the_merge() {
    let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
    fx_ctl
        .set_holdings(MockBehavior::Panic("bad payload"))
        .await;

    let err = composite.holdings().await.expect_err("oanda panics");

    assert_eq!(
        err,
        ConduitError::broker("mock:oanda/fx-7", "holdings panicked: bad payload")
    );
    assert_eq!(ib_ctl.call_count(MockOp::Holdings).await, 1);
}
