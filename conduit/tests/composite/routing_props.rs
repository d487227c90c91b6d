use conduit_core::{Broker, ConduitError, Order, RoutingError, SecurityType, Symbol};
use conduit_mock::MockOp;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::helpers::ib_and_oanda;

const CLASSES: [SecurityType; 8] = [
    SecurityType::Base,
    SecurityType::Equity,
    SecurityType::Option,
    SecurityType::Commodity,
    SecurityType::Forex,
    SecurityType::Future,
    SecurityType::Cfd,
    SecurityType::Crypto,
];

proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn each_order_reaches_at_most_the_mapped_broker(picks in proptest::collection::vec(0usize..CLASSES.len(), 1..12)) {
        tokio_test::block_on(async move {
            let (composite, ib_ctl, fx_ctl) = ib_and_oanda();
            let mut expect_ib = 0;
            let mut expect_fx = 0;

            for (i, pick) in picks.iter().enumerate() {
                let class = CLASSES[*pick];
                let order = Order::market(i as u64, Symbol::new("X", class), Decimal::ONE);
                let res = composite.place_order(&order).await;
                match class {
                    SecurityType::Equity => {
                        expect_ib += 1;
                        assert_eq!(res, Ok(true));
                    }
                    SecurityType::Forex => {
                        expect_fx += 1;
                        assert_eq!(res, Ok(true));
                    }
                    other => assert_eq!(
                        res,
                        Err(ConduitError::Routing(RoutingError::NoMapping { security_type: other }))
                    ),
                }
            }

            assert_eq!(ib_ctl.call_count(MockOp::PlaceOrder).await, expect_ib);
            assert_eq!(fx_ctl.call_count(MockOp::PlaceOrder).await, expect_fx);
        });
    }
}
