//! Order record: one submitted order and its fill accounting.
//!
//! An order is *resting* iff [`Order::resting_level`] is `Some`; only limit
//! orders rest. While resting, the order lives in the book's id index and its
//! back-reference names the owning price level.

use crate::types::{OrderId, OrderStatus, OrderType, Side, UserId};
use rust_decimal::Decimal;

/// One submitted order.
///
/// `price` is `Some` for Limit/Ioc/Fok and `None` for Market. The admission
/// `timestamp` is supplied by the caller, is immutable, and defines FIFO
/// priority within a price level.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub user_id: UserId,
    pub order_id: OrderId,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Option<Decimal>,
    pub original_quantity: u64,
    pub filled_quantity: u64,
    pub timestamp: u64,
    pub status: OrderStatus,
    /// Price of the owning level while resting. Cleared on unlink.
    #[serde(skip)]
    pub(crate) resting_at: Option<Decimal>,
}

impl Order {
    fn new(
        user_id: UserId,
        order_id: OrderId,
        side: Side,
        order_type: OrderType,
        price: Option<Decimal>,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            user_id,
            order_id,
            side,
            order_type,
            price,
            original_quantity: quantity,
            filled_quantity: 0,
            timestamp,
            status: OrderStatus::Created,
            resting_at: None,
        }
    }

    pub fn limit(
        user_id: impl Into<UserId>,
        order_id: impl Into<OrderId>,
        side: Side,
        price: Decimal,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self::new(
            user_id.into(),
            order_id.into(),
            side,
            OrderType::Limit,
            Some(price),
            quantity,
            timestamp,
        )
    }

    pub fn market(
        user_id: impl Into<UserId>,
        order_id: impl Into<OrderId>,
        side: Side,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self::new(
            user_id.into(),
            order_id.into(),
            side,
            OrderType::Market,
            None,
            quantity,
            timestamp,
        )
    }

    pub fn ioc(
        user_id: impl Into<UserId>,
        order_id: impl Into<OrderId>,
        side: Side,
        price: Decimal,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self::new(
            user_id.into(),
            order_id.into(),
            side,
            OrderType::Ioc,
            Some(price),
            quantity,
            timestamp,
        )
    }

    pub fn fok(
        user_id: impl Into<UserId>,
        order_id: impl Into<OrderId>,
        side: Side,
        price: Decimal,
        quantity: u64,
        timestamp: u64,
    ) -> Self {
        Self::new(
            user_id.into(),
            order_id.into(),
            side,
            OrderType::Fok,
            Some(price),
            quantity,
            timestamp,
        )
    }

    pub fn remaining_quantity(&self) -> u64 {
        self.original_quantity - self.filled_quantity
    }

    pub fn is_filled(&self) -> bool {
        self.remaining_quantity() == 0
    }

    pub fn is_resting(&self) -> bool {
        self.resting_at.is_some()
    }

    /// Price of the owning level, or `None` when the order is not resting.
    pub fn resting_level(&self) -> Option<Decimal> {
        self.resting_at
    }

    /// Records a fill of `quantity` units.
    pub(crate) fn fill(&mut self, quantity: u64) {
        debug_assert!(quantity <= self.remaining_quantity());
        self.filled_quantity += quantity;
    }

    /// Whether this order crosses a resting level at `level_price`.
    /// Market orders (no limit price) cross unconditionally.
    pub(crate) fn crosses(&self, level_price: Decimal) -> bool {
        let Some(limit) = self.price else { return true };
        match self.side {
            Side::Buy => limit >= level_price,
            Side::Sell => limit <= level_price,
        }
    }
}
