//! Trades and per-submission outcomes.
//!
//! [`Trade`] is the engine's internal record of one execution, appended to
//! the trade log in execution order. [`TradeEvent`] is the value copy handed
//! to publishers. [`Execution`] summarizes what one submission did.

use crate::types::{OrderId, OrderStatus, UserId};
use rust_decimal::Decimal;

/// One execution between a taker and the resting maker at the maker's price.
///
/// `user_id` is the taker. Exactly one buy and one sell order per trade;
/// the timestamp is the incoming taker's.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trade {
    pub user_id: UserId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Decimal,
    pub quantity: u64,
    pub timestamp: u64,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

/// Immutable value copy of a [`Trade`] for publishers. Carries no
/// back-references into engine state.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradeEvent {
    pub user_id: UserId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Decimal,
    pub quantity: u64,
    pub timestamp: u64,
    pub maker_fee: Decimal,
    pub taker_fee: Decimal,
}

impl From<&Trade> for TradeEvent {
    fn from(trade: &Trade) -> Self {
        Self {
            user_id: trade.user_id.clone(),
            buy_order_id: trade.buy_order_id.clone(),
            sell_order_id: trade.sell_order_id.clone(),
            price: trade.price,
            quantity: trade.quantity,
            timestamp: trade.timestamp,
            maker_fee: trade.maker_fee,
            taker_fee: trade.taker_fee,
        }
    }
}

/// Outcome of one submission: the order's final status, fill accounting,
/// and the trades it produced, in execution order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Execution {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub filled_quantity: u64,
    pub remaining_quantity: u64,
    pub trades: Vec<Trade>,
}
