//! Single-instrument order book: bid and ask ladders with price-time priority.
//!
//! Each ladder is a `BTreeMap` keyed by price; best bid is the largest key,
//! best ask the smallest. The id index is the single owner of every resting
//! order. Cached best-bid/best-ask prices are refreshed from the ladder
//! extrema after every mutation that can change them.

use crate::order::Order;
use crate::price_level::PriceLevel;
use crate::types::{Bbo, L2Level, L2Snapshot, OrderId, OrderStatus, OrderType, Quote, Side, UserId};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

/// One maker fill taken from the head of the best opposite level.
#[derive(Clone, Debug)]
pub struct Fill {
    pub maker_order_id: OrderId,
    pub maker_user_id: UserId,
    pub maker_side: Side,
    pub price: Decimal,
    pub quantity: u64,
    /// True if the maker was fully consumed and unlinked from the book.
    pub maker_completed: bool,
}

/// Two-sided book: bids traversed largest-first, asks smallest-first.
#[derive(Debug, Default)]
pub struct OrderBook {
    bids: BTreeMap<Decimal, PriceLevel>,
    asks: BTreeMap<Decimal, PriceLevel>,
    /// Resting orders by id. Present iff the order is linked into a level.
    orders: HashMap<OrderId, Order>,
    best_bid: Option<Decimal>,
    best_ask: Option<Decimal>,
}

impl OrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rests a limit order: finds or creates the level at its price, links
    /// the order at the tail, and indexes it by id. Status becomes Open, or
    /// PartiallyFilled when the order already has fills from matching.
    ///
    /// Callers validate the order first; a limit order always carries a price.
    pub fn insert_limit(&mut self, mut order: Order) {
        debug_assert_eq!(order.order_type, OrderType::Limit);
        debug_assert!(!order.is_resting());
        debug_assert!(order.remaining_quantity() > 0);
        let Some(price) = order.price else { return };

        order.status = if order.filled_quantity > 0 {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Open
        };

        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = ladder.entry(price).or_insert_with(|| PriceLevel::new(price));
        level.add_order(&mut order);
        self.orders.insert(order.order_id.clone(), order);
        self.refresh_best();
    }

    /// Cancels a resting order by id. Returns the removed order with status
    /// Cancelled, or `None` for unknown (or already terminal) ids; failure
    /// has no side effects.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Option<Order> {
        let mut order = self.orders.remove(order_id)?;
        debug_assert!(matches!(
            order.status,
            OrderStatus::Open | OrderStatus::PartiallyFilled
        ));

        let side = order.side;
        let mut emptied = None;
        if let Some(price) = order.resting_at {
            let ladder = match side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            if let Some(level) = ladder.get_mut(&price) {
                level.remove_order(&mut order);
                level.reduce_quantity(order.remaining_quantity());
                if level.is_empty() {
                    emptied = Some(price);
                }
            }
        }
        if let Some(price) = emptied {
            self.remove_price_level(side, price);
        }
        order.status = OrderStatus::Cancelled;
        Some(order)
    }

    /// Best bid level (highest price), if any.
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.best_bid.and_then(|p| self.bids.get(&p))
    }

    /// Best ask level (lowest price), if any.
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.best_ask.and_then(|p| self.asks.get(&p))
    }

    /// The level an incoming order on `taker_side` would match first.
    pub fn best_opposite(&self, taker_side: Side) -> Option<&PriceLevel> {
        match taker_side {
            Side::Buy => self.best_ask(),
            Side::Sell => self.best_bid(),
        }
    }

    /// Looks up a resting order by id.
    pub fn order(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    /// Number of resting orders across both sides.
    pub fn resting_order_count(&self) -> usize {
        self.orders.len()
    }

    /// Fill-feasibility pre-scan for fill-or-kill: walks the opposite ladder
    /// in match order, summing quantity from levels the order still crosses,
    /// and stops as soon as the requirement is covered. Touches no state.
    pub fn can_fully_fill(&self, order: &Order) -> bool {
        let mut required = order.remaining_quantity();
        match order.side {
            Side::Buy => {
                for (price, level) in &self.asks {
                    if required == 0 || !order.crosses(*price) {
                        break;
                    }
                    required = required.saturating_sub(level.total_quantity());
                }
            }
            Side::Sell => {
                for (price, level) in self.bids.iter().rev() {
                    if required == 0 || !order.crosses(*price) {
                        break;
                    }
                    required = required.saturating_sub(level.total_quantity());
                }
            }
        }
        required == 0
    }

    /// Executes one head fill at the best opposite level: decrements the
    /// maker's remaining quantity and the level total, unlinks the maker if
    /// fully consumed, and prunes the level if that left it empty.
    ///
    /// The caller re-reads the best opposite and re-checks the cross
    /// predicate before every call.
    pub(crate) fn fill_best_opposite(&mut self, taker_side: Side, want: u64) -> Option<Fill> {
        debug_assert!(want > 0);
        let price = match taker_side {
            Side::Buy => self.best_ask?,
            Side::Sell => self.best_bid?,
        };
        let maker_side = taker_side.opposite();
        let ladder = match maker_side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let level = ladder.get_mut(&price)?;
        let maker_id = level.head()?.clone();
        let maker = self.orders.get_mut(&maker_id)?;

        let quantity = want.min(maker.remaining_quantity());
        debug_assert!(quantity > 0);
        maker.fill(quantity);
        level.reduce_quantity(quantity);

        let maker_user_id = maker.user_id.clone();
        let maker_completed = maker.is_filled();
        maker.status = if maker_completed {
            OrderStatus::Completed
        } else {
            OrderStatus::PartiallyFilled
        };

        let mut emptied = false;
        if maker_completed {
            if let Some(mut done) = self.orders.remove(&maker_id) {
                level.remove_order(&mut done);
            }
            emptied = level.is_empty();
        }
        if emptied {
            self.remove_price_level(maker_side, price);
        }

        Some(Fill {
            maker_order_id: maker_id,
            maker_user_id,
            maker_side,
            price,
            quantity,
            maker_completed,
        })
    }

    /// Erases a level from its ladder and refreshes the best caches.
    pub(crate) fn remove_price_level(&mut self, side: Side, price: Decimal) {
        let ladder = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        ladder.remove(&price);
        self.refresh_best();
    }

    fn refresh_best(&mut self) {
        self.best_bid = self.bids.keys().next_back().copied();
        self.best_ask = self.asks.keys().next().copied();
    }

    /// Top-of-book snapshot: best price and aggregate quantity per side.
    pub fn bbo(&self) -> Bbo {
        Bbo {
            bid: self.best_bid().map(|level| Quote {
                price: level.price(),
                quantity: level.total_quantity(),
            }),
            ask: self.best_ask().map(|level| Quote {
                price: level.price(),
                quantity: level.total_quantity(),
            }),
        }
    }

    /// Aggregated depth: up to `depth` levels per side in match order.
    pub fn l2_snapshot(&self, depth: usize) -> L2Snapshot {
        let bids = self
            .bids
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| L2Level {
                price: *price,
                quantity: level.total_quantity(),
            })
            .collect();
        let asks = self
            .asks
            .iter()
            .take(depth)
            .map(|(price, level)| L2Level {
                price: *price,
                quantity: level.total_quantity(),
            })
            .collect();
        L2Snapshot { bids, asks }
    }

    /// Structural invariant check used by unit tests across the crate.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        for (ladder, side) in [(&self.bids, Side::Buy), (&self.asks, Side::Sell)] {
            for (price, level) in ladder {
                assert!(level.order_count() > 0, "empty level persisted at {price}");
                assert_eq!(level.price(), *price);
                let mut total = 0u64;
                for id in level.iter() {
                    let order = self.orders.get(id).expect("resting order indexed");
                    assert_eq!(order.side, side);
                    assert_eq!(order.price, Some(*price));
                    assert_eq!(order.resting_level(), Some(*price));
                    total += order.remaining_quantity();
                }
                assert_eq!(level.total_quantity(), total);
            }
        }
        assert_eq!(self.best_bid, self.bids.keys().next_back().copied());
        assert_eq!(self.best_ask, self.asks.keys().next().copied());
        for (id, order) in &self.orders {
            assert_eq!(&order.order_id, id);
            assert!(order.is_resting());
        }
    }
}
