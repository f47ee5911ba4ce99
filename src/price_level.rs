//! One price on one side of the book: a FIFO queue of resting orders.
//!
//! The queue holds order ids; the book's id index owns the orders themselves.
//! Head is oldest and matches first. `total_quantity` caches the sum of
//! remaining quantities so depth snapshots and the fill-or-kill pre-scan
//! never walk the queue.

use crate::order::Order;
use crate::types::OrderId;
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// FIFO queue of resting orders at one price.
///
/// `remove_order` does not touch `total_quantity`: during matching the
/// traded quantity is deducted via `reduce_quantity` before the filled order
/// is unlinked, while cancellation deducts the whole remaining quantity at
/// once. Keeping the two operations separate keeps the cache exact on both
/// paths.
#[derive(Clone, Debug, serde::Serialize)]
pub struct PriceLevel {
    price: Decimal,
    total_quantity: u64,
    queue: VecDeque<OrderId>,
}

impl PriceLevel {
    pub(crate) fn new(price: Decimal) -> Self {
        debug_assert!(price > Decimal::ZERO);
        Self {
            price,
            total_quantity: 0,
            queue: VecDeque::new(),
        }
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn total_quantity(&self) -> u64 {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Oldest resting order at this price.
    pub fn head(&self) -> Option<&OrderId> {
        self.queue.front()
    }

    /// Resting order ids in FIFO order, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &OrderId> {
        self.queue.iter()
    }

    /// Appends `order` at the tail (newest, lowest time priority) and links
    /// its back-reference to this level.
    pub(crate) fn add_order(&mut self, order: &mut Order) {
        debug_assert!(!order.is_resting());
        debug_assert!(order.remaining_quantity() > 0);
        debug_assert_eq!(order.price, Some(self.price));

        self.queue.push_back(order.order_id.clone());
        self.total_quantity += order.remaining_quantity();
        order.resting_at = Some(self.price);
    }

    /// Unlinks `order` from the queue and clears its back-reference.
    /// Does not change `total_quantity`; callers deduct what they removed.
    pub(crate) fn remove_order(&mut self, order: &mut Order) {
        debug_assert_eq!(order.resting_at, Some(self.price));

        if let Some(pos) = self.queue.iter().position(|id| *id == order.order_id) {
            self.queue.remove(pos);
        }
        order.resting_at = None;
    }

    /// Deducts a traded or cancelled quantity from the cached total.
    pub(crate) fn reduce_quantity(&mut self, quantity: u64) {
        debug_assert!(quantity <= self.total_quantity);
        self.total_quantity -= quantity;
    }
}
