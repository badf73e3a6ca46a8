//! End-to-end fill scenarios exercised through the public engine API.

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use fill_engine::data::{Bar, QuoteBar, SecuritySnapshot, SubscriptionInfo, Tick, TradeBar};
use fill_engine::sessions::SessionSchedule;
use fill_engine::{
    FillEngine, FillStatus, GroupContext, GroupLeg, GroupRegistry, Order, OrderId,
};

// Monday 2024-03-04, 09:30 New York
fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
}

fn bar(
    symbol: &str,
    ts: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
) -> TradeBar {
    TradeBar::new(ts, symbol, Duration::minutes(1), open, high, low, close, dec!(10000))
}

#[test]
fn unresolvable_price_yields_empty_fill_for_every_order_type() {
    let engine = FillEngine::new();
    let snapshot = SecuritySnapshot::new("AAPL", t0());
    let sub = SubscriptionInfo::bars();

    let mut orders = vec![
        Order::market("AAPL", dec!(100), t0()),
        Order::limit("AAPL", dec!(100), dec!(99), t0()),
        Order::stop_market("AAPL", dec!(-100), dec!(98), t0()),
        Order::stop_limit("AAPL", dec!(100), dec!(101), dec!(100.5), t0()),
        Order::limit_if_touched("AAPL", dec!(100), dec!(99), dec!(98.5), t0()),
        Order::market_on_open("AAPL", dec!(100), t0()),
        Order::market_on_close("AAPL", dec!(100), t0()),
    ];

    for order in orders.iter_mut() {
        let events = engine.fill(order, &snapshot, &sub, None).unwrap();
        assert_eq!(events.len(), 1, "{} should yield one event", order.kind);
        assert_eq!(events[0].status, FillStatus::None);
        assert_eq!(events[0].fill_quantity, Decimal::ZERO);
        assert_eq!(events[0].fill_price, Decimal::ZERO);
    }
}

#[test]
fn market_order_fills_full_quantity_at_direction_price() {
    let engine = FillEngine::new();
    let tick = Tick::quote(t0(), "AAPL", dec!(101.12), dec!(101.121), dec!(101.123));
    let snapshot = SecuritySnapshot::new("AAPL", t0()).with_tick(tick);

    let mut buy = Order::market("AAPL", dec!(100), t0());
    let events = engine
        .fill(&mut buy, &snapshot, &SubscriptionInfo::ticks(), None)
        .unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_quantity, dec!(100));
    assert_eq!(events[0].fill_price, dec!(101.123));

    let mut sell = Order::market("AAPL", dec!(-100), t0());
    let events = engine
        .fill(&mut sell, &snapshot, &SubscriptionInfo::ticks(), None)
        .unwrap();
    assert_eq!(events[0].fill_price, dec!(101.121));
    assert_eq!(events[0].fill_quantity, dec!(-100));
}

#[test]
fn limit_buy_fills_at_worst_case_price() {
    let engine = FillEngine::new();
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(1))
        .with_trade_bar(bar("AAPL", t0(), dec!(102), dec!(103), dec!(101), dec!(102.3)));
    let sub = SubscriptionInfo::bars();

    // Low 101 <= limit 101.5 -> fill at min(101.5, 103) = 101.5
    let mut order = Order::limit("AAPL", dec!(100), dec!(101.5), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].fill_price, dec!(101.5));

    // Limit below the bar low: no fill
    let mut order = Order::limit("AAPL", dec!(100), dec!(100.5), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::None);
}

#[test]
fn limit_sell_fills_at_worst_case_price() {
    let engine = FillEngine::new();
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(1))
        .with_trade_bar(bar("AAPL", t0(), dec!(102), dec!(103), dec!(101), dec!(102.3)));
    let sub = SubscriptionInfo::bars();

    // High 103 >= limit 102.5 -> fill at max(102.5, 101) = 102.5
    let mut order = Order::limit("AAPL", dec!(-100), dec!(102.5), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].fill_price, dec!(102.5));

    // Limit above the bar high: no fill
    let mut order = Order::limit("AAPL", dec!(-100), dec!(103.5), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::None);
}

#[test]
fn extended_hours_gating_respects_subscription() {
    let engine = FillEngine::new();
    // 09:00 New York: pre-market
    let pre_market = Utc.with_ymd_and_hms(2024, 3, 4, 14, 0, 0).unwrap();
    let snapshot = SecuritySnapshot::new("AAPL", pre_market)
        .with_session(SessionSchedule::us_equity())
        .with_trade_bar(bar(
            "AAPL",
            pre_market - Duration::minutes(1),
            dec!(102),
            dec!(103),
            dec!(101),
            dec!(102.3),
        ));

    let mut order = Order::limit("AAPL", dec!(100), dec!(101.5), pre_market - Duration::hours(1));

    let events = engine
        .fill(&mut order, &snapshot, &SubscriptionInfo::bars(), None)
        .unwrap();
    assert_eq!(events[0].status, FillStatus::None);
    assert_eq!(events[0].fill_quantity, Decimal::ZERO);

    // Same bar, extended hours enabled: fills
    let events = engine
        .fill(
            &mut order,
            &snapshot,
            &SubscriptionInfo::bars().with_extended_hours(),
            None,
        )
        .unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(101.5));
}

#[test]
fn data_before_submission_is_excluded() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars();
    let submitted = t0();
    let mut order = Order::limit("AAPL", dec!(100), dec!(101.5), submitted);

    // A bar from before submission satisfies the price condition but
    // must never fill the order
    let stale = SecuritySnapshot::new("AAPL", submitted)
        .with_trade_bar(bar("AAPL", submitted - Duration::minutes(2), dec!(102), dec!(103), dec!(101), dec!(102.3)));
    let events = engine.fill(&mut order, &stale, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::None);

    // The first bar at/after submission fills
    let fresh = SecuritySnapshot::new("AAPL", submitted + Duration::minutes(1))
        .with_trade_bar(bar("AAPL", submitted, dec!(102), dec!(103), dec!(101), dec!(102.3)));
    let events = engine.fill(&mut order, &fresh, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(101.5));
}

#[test]
fn stale_price_fill_carries_warning() {
    let engine = FillEngine::new();
    // Last update 90 minutes before evaluation; default threshold is 1 hour
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(90))
        .with_trade_bar(bar("AAPL", t0() - Duration::minutes(1), dec!(102), dec!(103), dec!(101), dec!(102.3)));

    let mut order = Order::market("AAPL", dec!(100), t0() - Duration::minutes(1));
    let events = engine
        .fill(&mut order, &snapshot, &SubscriptionInfo::bars(), None)
        .unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(102.3));
    assert!(events[0].message.as_deref().unwrap().contains("stale price"));
}

#[test]
fn combo_group_fills_atomically_in_registration_order() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars();
    let mut registry = GroupRegistry::new();
    let gid = registry.create(dec!(2));

    let submitted = t0() - Duration::minutes(5);
    let mut leg_a = Order::combo_leg_limit("AAA", dec!(1), dec!(10), gid.clone(), submitted).with_id("A");
    let leg_b = Order::combo_leg_limit("BBB", dec!(-1), dec!(20), gid.clone(), submitted).with_id("B");
    {
        let group = registry.get_mut(&gid).unwrap();
        group.register(OrderId::new("A"));
        group.register(OrderId::new("B"));
    }

    // Leg A's condition holds, leg B's does not: empty result set
    let snap_a = SecuritySnapshot::new("AAA", t0())
        .with_trade_bar(bar("AAA", t0(), dec!(10.5), dec!(11), dec!(9), dec!(10.2)));
    let snap_b = SecuritySnapshot::new("BBB", t0())
        .with_trade_bar(bar("BBB", t0(), dec!(19), dec!(19.5), dec!(18.5), dec!(19.2)));

    let legs = [GroupLeg::new(&leg_b, &snap_b, &sub)];
    let events = engine
        .fill(
            &mut leg_a,
            &snap_a,
            &sub,
            Some(GroupContext {
                registry: &mut registry,
                legs: &legs,
            }),
        )
        .unwrap();
    assert!(events.is_empty());

    // Leg B's bar reaches its limit: the next invocation releases every
    // leg, in registration order, scaled by the group ratio
    let snap_b = SecuritySnapshot::new("BBB", t0() + Duration::minutes(1))
        .with_trade_bar(bar("BBB", t0() + Duration::minutes(1), dec!(19.8), dec!(20.5), dec!(19.5), dec!(20.1)));
    let legs = [GroupLeg::new(&leg_b, &snap_b, &sub)];
    let events = engine
        .fill(
            &mut leg_a,
            &snap_a,
            &sub,
            Some(GroupContext {
                registry: &mut registry,
                legs: &legs,
            }),
        )
        .unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].order_id, OrderId::new("A"));
    assert_eq!(events[0].fill_quantity, dec!(2)); // 1 x ratio 2
    assert_eq!(events[1].order_id, OrderId::new("B"));
    assert_eq!(events[1].fill_quantity, dec!(-2)); // -1 x ratio 2
}

#[test]
fn resolved_combo_group_never_re_emits() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars();
    let mut registry = GroupRegistry::new();
    let gid = registry.create(dec!(1));

    let mut leg_a = Order::combo_market("AAA", dec!(1), gid.clone(), t0()).with_id("A");
    let mut leg_b = Order::combo_market("BBB", dec!(-1), gid.clone(), t0()).with_id("B");
    {
        let group = registry.get_mut(&gid).unwrap();
        group.register(OrderId::new("A"));
        group.register(OrderId::new("B"));
    }

    let snap_a = SecuritySnapshot::new("AAA", t0())
        .with_trade_bar(bar("AAA", t0(), dec!(10), dec!(11), dec!(9), dec!(10.5)));
    let snap_b = SecuritySnapshot::new("BBB", t0())
        .with_trade_bar(bar("BBB", t0(), dec!(20), dec!(21), dec!(19), dec!(20.5)));

    let leg_b_view = leg_b.clone();
    let legs_for_a = [GroupLeg::new(&leg_b_view, &snap_b, &sub)];
    let events = engine
        .fill(
            &mut leg_a,
            &snap_a,
            &sub,
            Some(GroupContext {
                registry: &mut registry,
                legs: &legs_for_a,
            }),
        )
        .unwrap();
    assert!(events.is_empty()); // leg B not yet evaluated

    let leg_a_view = leg_a.clone();
    let legs_for_b = [GroupLeg::new(&leg_a_view, &snap_a, &sub)];
    let events = engine
        .fill(
            &mut leg_b,
            &snap_b,
            &sub,
            Some(GroupContext {
                registry: &mut registry,
                legs: &legs_for_b,
            }),
        )
        .unwrap();
    assert_eq!(events.len(), 2);

    // Re-evaluating the resolved group emits nothing
    for _ in 0..2 {
        let events = engine
            .fill(
                &mut leg_b,
                &snap_b,
                &sub,
                Some(GroupContext {
                    registry: &mut registry,
                    legs: &legs_for_b,
                }),
            )
            .unwrap();
        assert!(events.is_empty());
    }
}

#[test]
fn tick_subscription_controls_price_source() {
    let engine = FillEngine::new();
    let trade = bar("AAPL", t0(), dec!(102), dec!(103), dec!(101), dec!(102.3));
    let tick = Tick::trade(t0() + Duration::minutes(2), "AAPL", dec!(104.5));
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(2))
        .with_trade_bar(trade)
        .with_tick(tick);

    // Tick-resolution subscription: the newer tick wins
    let mut order = Order::market("AAPL", dec!(100), t0());
    let events = engine
        .fill(&mut order, &snapshot, &SubscriptionInfo::ticks(), None)
        .unwrap();
    assert_eq!(events[0].fill_price, dec!(104.5));

    // Bar-resolution subscription: the bar wins even with a cached tick
    let mut order = Order::market("AAPL", dec!(100), t0());
    let events = engine
        .fill(&mut order, &snapshot, &SubscriptionInfo::bars(), None)
        .unwrap();
    assert_eq!(events[0].fill_price, dec!(102.3));
}

#[test]
fn stop_market_triggers_on_current_price() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars();

    // Buy stop 102: bar close 102.3 crosses it
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(1))
        .with_trade_bar(bar("AAPL", t0(), dec!(101), dec!(103), dec!(100.5), dec!(102.3)));
    let mut order = Order::stop_market("AAPL", dec!(100), dec!(102), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(102.3));

    // Sell stop 102: close 102.3 stays above, no trigger
    let mut order = Order::stop_market("AAPL", dec!(-100), dec!(102), t0());
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::None);
}

#[test]
fn limit_if_touched_uses_quote_view_when_subscribed() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars().with_quotes();
    let submitted = t0() - Duration::minutes(5);
    let mut order = Order::limit_if_touched("AAPL", dec!(100), dec!(100), dec!(100.8), submitted);

    // Touch: trade-bar low reaches the trigger
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(1))
        .with_trade_bar(bar("AAPL", t0(), dec!(102), dec!(103), dec!(99.5), dec!(100.5)))
        .with_quote_bar(QuoteBar::new(
            t0(),
            "AAPL",
            Duration::minutes(1),
            Bar::new(dec!(101.9), dec!(102.9), dec!(99.4), dec!(100.4)),
            Bar::new(dec!(102.1), dec!(103.1), dec!(99.6), dec!(100.6)),
        ));
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::None); // touch only latches

    // Later evaluation: ask-side low 100.2 <= limit 100.8 -> exact limit
    let snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(2))
        .with_trade_bar(bar("AAPL", t0() + Duration::minutes(1), dec!(100.5), dec!(101), dec!(100.3), dec!(100.9)))
        .with_quote_bar(QuoteBar::new(
            t0() + Duration::minutes(1),
            "AAPL",
            Duration::minutes(1),
            Bar::new(dec!(100.4), dec!(100.9), dec!(100.1), dec!(100.8)),
            Bar::new(dec!(100.6), dec!(101.1), dec!(100.2), dec!(101.0)),
        ));
    let events = engine.fill(&mut order, &snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(100.8));
}

#[test]
fn market_on_open_and_close_anchor_to_the_session() {
    let engine = FillEngine::new();
    let sub = SubscriptionInfo::bars();
    let schedule = SessionSchedule::us_equity();
    let close_utc = Utc.with_ymd_and_hms(2024, 3, 4, 21, 0, 0).unwrap();

    // Opening bar 09:30-09:31 New York
    let open_snapshot = SecuritySnapshot::new("AAPL", t0() + Duration::minutes(1))
        .with_session(schedule.clone())
        .with_trade_bar(bar("AAPL", t0(), dec!(102), dec!(103), dec!(101), dec!(102.3)));
    let mut moo = Order::market_on_open("AAPL", dec!(100), t0() - Duration::hours(2));
    let events = engine.fill(&mut moo, &open_snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(102)); // the bar's open

    // Closing bar 15:59-16:00 New York
    let close_snapshot = SecuritySnapshot::new("AAPL", close_utc)
        .with_session(schedule)
        .with_trade_bar(bar("AAPL", close_utc - Duration::minutes(1), dec!(102), dec!(103), dec!(101), dec!(102.7)));
    let mut moc = Order::market_on_close("AAPL", dec!(100), t0());
    let events = engine.fill(&mut moc, &close_snapshot, &sub, None).unwrap();
    assert_eq!(events[0].status, FillStatus::Filled);
    assert_eq!(events[0].fill_price, dec!(102.7)); // the bar's close
}
