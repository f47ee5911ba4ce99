//! Scenario tests exercising the public engine API end to end: multi-level
//! sweeps, the four order-type disciplines, the status state machine,
//! cancellation, and fee-tier promotion.

use matchbook::{MatchingEngine, Order, OrderId, OrderStatus, Side, UserId};
use rust_decimal::Decimal;

fn price(p: i64) -> Decimal {
    Decimal::from(p)
}

#[test]
fn partial_fill_then_multi_level_sweep() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 5, 1))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S2", Side::Sell, price(102), 5, 2))
        .unwrap();
    engine
        .process_order(Order::limit("b", "B1", Side::Buy, price(99), 5, 3))
        .unwrap();

    // BUY 3 @ 101 takes part of the first seller.
    let exec = engine
        .process_order(Order::limit("b", "B2", Side::Buy, price(101), 3, 4))
        .unwrap();
    assert_eq!(exec.status, OrderStatus::Completed);
    assert_eq!(exec.trades.len(), 1);
    assert_eq!(exec.trades[0].price, price(101));
    assert_eq!(exec.trades[0].quantity, 3);

    // BUY 6 @ 103 finishes S1 (2 left) and takes 4 from S2.
    let exec = engine
        .process_order(Order::limit("b", "B3", Side::Buy, price(103), 6, 5))
        .unwrap();
    assert_eq!(exec.status, OrderStatus::Completed);
    let fills: Vec<(Decimal, u64)> = exec.trades.iter().map(|t| (t.price, t.quantity)).collect();
    assert_eq!(fills, vec![(price(101), 2), (price(102), 4)]);

    // S1 is gone, S2 has 1 unit left at 102.
    assert!(engine.book().order(&OrderId::from("S1")).is_none());
    let s2 = engine.book().order(&OrderId::from("S2")).expect("S2 rests");
    assert_eq!(s2.remaining_quantity(), 1);
    assert_eq!(s2.status, OrderStatus::PartiallyFilled);
    assert_eq!(engine.bbo().ask.map(|q| (q.price, q.quantity)), Some((price(102), 1)));

    assert!(engine.cancel_order(&OrderId::from("B1")));
    assert!(engine.bbo().bid.is_none());
}

#[test]
fn market_order_ladders_through_liquidity() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 2, 1))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S2", Side::Sell, price(102), 3, 2))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S3", Side::Sell, price(103), 5, 3))
        .unwrap();

    let exec = engine
        .process_order(Order::market("m", "M1", Side::Buy, 12, 4))
        .unwrap();

    let fills: Vec<(Decimal, u64)> = exec.trades.iter().map(|t| (t.price, t.quantity)).collect();
    assert_eq!(fills, vec![(price(101), 2), (price(102), 3), (price(103), 5)]);
    assert_eq!(exec.status, OrderStatus::PartiallyFilled);
    assert_eq!(exec.filled_quantity, 10);
    assert_eq!(exec.remaining_quantity, 2);
    // never rests
    assert!(engine.book().order(&OrderId::from("M1")).is_none());
    assert!(engine.bbo().ask.is_none());
}

#[test]
fn ioc_fills_up_to_limit_and_cancels_rest() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 3, 1))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S2", Side::Sell, price(103), 5, 2))
        .unwrap();

    let exec = engine
        .process_order(Order::ioc("i", "IOC1", Side::Buy, price(102), 10, 3))
        .unwrap();

    assert_eq!(exec.trades.len(), 1);
    assert_eq!(exec.trades[0].price, price(101));
    assert_eq!(exec.trades[0].quantity, 3);
    assert_eq!(exec.status, OrderStatus::PartiallyFilled);
    assert_eq!(exec.filled_quantity, 3);
    assert_eq!(exec.remaining_quantity, 7);
    assert!(engine.book().order(&OrderId::from("IOC1")).is_none());

    // the 103 level is untouched
    let s2 = engine.book().order(&OrderId::from("S2")).expect("S2 rests");
    assert_eq!(s2.remaining_quantity(), 5);
    assert_eq!(s2.status, OrderStatus::Open);
}

#[test]
fn fok_without_full_liquidity_is_killed_atomically() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 3, 1))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S2", Side::Sell, price(102), 2, 2))
        .unwrap();
    let before = engine.l2_snapshot(10);

    let exec = engine
        .process_order(Order::fok("f", "FOK1", Side::Buy, price(103), 6, 3))
        .unwrap();

    assert_eq!(exec.status, OrderStatus::Cancelled);
    assert_eq!(exec.filled_quantity, 0);
    assert!(exec.trades.is_empty());
    assert!(engine.trades().is_empty());
    assert_eq!(engine.l2_snapshot(10), before, "book unchanged");
}

#[test]
fn fok_with_full_liquidity_completes() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 3, 1))
        .unwrap();
    engine
        .process_order(Order::limit("s", "S2", Side::Sell, price(102), 3, 2))
        .unwrap();

    let exec = engine
        .process_order(Order::fok("f", "FOK1", Side::Buy, price(102), 5, 3))
        .unwrap();
    assert_eq!(exec.status, OrderStatus::Completed);
    assert_eq!(exec.filled_quantity, 5);
    let fills: Vec<(Decimal, u64)> = exec.trades.iter().map(|t| (t.price, t.quantity)).collect();
    assert_eq!(fills, vec![(price(101), 3), (price(102), 2)]);
}

#[test]
fn fee_tier_crossing_rebates_the_maker() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("V", "S1", Side::Sell, price(100), 2000, 1))
        .unwrap();
    let exec = engine
        .process_order(Order::market("B", "B1", Side::Buy, 2000, 2))
        .unwrap();

    // notional 200_000 promotes both users to tier 1; the same trade is
    // charged at the new rates
    assert_eq!(exec.trades.len(), 1);
    assert_eq!(exec.trades[0].maker_fee, Decimal::from(-20));
    assert_eq!(exec.trades[0].taker_fee, Decimal::from(80));
    assert_eq!(engine.fees().tier_index_for(&UserId::from("V")), 1);
    assert_eq!(engine.fees().tier_index_for(&UserId::from("B")), 1);
    assert_eq!(engine.fees().rolling_volume(&UserId::from("B")), Decimal::from(200_000));
}

#[test]
fn cancel_is_idempotent() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(101), 5, 1))
        .unwrap();

    assert!(engine.cancel_order(&OrderId::from("S1")));
    assert!(engine.bbo().ask.is_none());
    assert!(!engine.cancel_order(&OrderId::from("S1")), "second cancel fails");
    assert!(!engine.cancel_order(&OrderId::from("never-existed")));
}

#[test]
fn status_state_machine() {
    let mut engine = MatchingEngine::new();
    let exec = engine
        .process_order(Order::limit("v", "S1", Side::Sell, price(101), 5, 1))
        .unwrap();
    assert_eq!(exec.status, OrderStatus::Open);

    let exec = engine
        .process_order(Order::limit("b", "B1", Side::Buy, price(101), 3, 2))
        .unwrap();
    assert_eq!(exec.status, OrderStatus::Completed);
    let s1 = engine.book().order(&OrderId::from("S1")).expect("still resting");
    assert_eq!(s1.status, OrderStatus::PartiallyFilled);
    assert_eq!(s1.remaining_quantity(), 2);

    assert!(engine.cancel_order(&OrderId::from("S1")));
    // terminal: further cancels are no-ops
    assert!(!engine.cancel_order(&OrderId::from("S1")));
    assert!(engine.book().order(&OrderId::from("S1")).is_none());
}

#[test]
fn cancel_after_partial_fill_removes_remaining_quantity() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("v", "S1", Side::Sell, price(101), 5, 1))
        .unwrap();
    engine
        .process_order(Order::limit("b", "B1", Side::Buy, price(101), 3, 2))
        .unwrap();
    assert_eq!(engine.bbo().ask.map(|q| q.quantity), Some(2));

    assert!(engine.cancel_order(&OrderId::from("S1")));
    assert!(engine.bbo().ask.is_none());
}

#[test]
fn trades_keep_buy_and_sell_ids_straight_for_sell_takers() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("b", "B1", Side::Buy, price(100), 5, 1))
        .unwrap();
    let exec = engine
        .process_order(Order::limit("s", "S1", Side::Sell, price(100), 5, 2))
        .unwrap();

    assert_eq!(exec.trades.len(), 1);
    let trade = &exec.trades[0];
    assert_eq!(trade.buy_order_id, OrderId::from("B1"));
    assert_eq!(trade.sell_order_id, OrderId::from("S1"));
    assert_eq!(trade.user_id, UserId::from("s"), "taker is the trade's user");
    assert_eq!(trade.timestamp, 2, "trade carries the taker's timestamp");
}

#[test]
fn l2_snapshot_aggregates_resting_quantity() {
    let mut engine = MatchingEngine::new();
    engine
        .process_order(Order::limit("a", "A1", Side::Sell, price(102), 4, 1))
        .unwrap();
    engine
        .process_order(Order::limit("a", "A2", Side::Sell, price(102), 6, 2))
        .unwrap();
    engine
        .process_order(Order::limit("b", "B1", Side::Buy, price(100), 3, 3))
        .unwrap();

    let snap = engine.l2_snapshot(5);
    assert_eq!(snap.asks.len(), 1);
    assert_eq!(snap.asks[0].price, price(102));
    assert_eq!(snap.asks[0].quantity, 10);
    assert_eq!(snap.bids.len(), 1);
    assert_eq!(snap.bids[0].quantity, 3);
}
