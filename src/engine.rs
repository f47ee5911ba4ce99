//! Matching engine: order-type dispatch, the matching loop, fee application,
//! and trade emission.
//!
//! Single-writer and synchronous: one actor submits events serially, the
//! engine mutates state and emits derived trades before returning. Callers
//! that need parallel ingress must serialize externally (see `api`).

use crate::execution::{Execution, Trade, TradeEvent};
use crate::fees::FeeCalculator;
use crate::order::Order;
use crate::order_book::{Fill, OrderBook};
use crate::publisher::TradePublisher;
use crate::types::{Bbo, L2Snapshot, OrderId, OrderStatus, OrderType, Side};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, trace};

/// Rejections raised before matching touches any state. Business outcomes
/// (fill-or-kill killed, market order with no liquidity) are statuses on the
/// returned [`Execution`], never errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("order {0} has zero quantity or pre-existing fills")]
    InvalidQuantity(OrderId),

    #[error("order {0} requires a positive limit price")]
    InvalidPrice(OrderId),

    #[error("order {0} was already submitted")]
    AlreadySubmitted(OrderId),

    #[error("order id {0} is already resting on the book")]
    DuplicateOrderId(OrderId),
}

/// Single-instrument matching engine.
///
/// Submit with [`MatchingEngine::process_order`]; cancel with
/// [`MatchingEngine::cancel_order`]; read market data with
/// [`MatchingEngine::bbo`] and [`MatchingEngine::l2_snapshot`].
pub struct MatchingEngine {
    book: OrderBook,
    fees: FeeCalculator,
    trades: Vec<Trade>,
    publisher: Option<Box<dyn TradePublisher>>,
    last_timestamp: u64,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::with_fees(FeeCalculator::default())
    }

    pub fn with_fees(fees: FeeCalculator) -> Self {
        Self {
            book: OrderBook::new(),
            fees,
            trades: Vec::new(),
            publisher: None,
            last_timestamp: 0,
        }
    }

    /// Attaches (or detaches, with `None`) the trade publisher. Events are
    /// delivered synchronously in execution order.
    pub fn set_trade_publisher(&mut self, publisher: Option<Box<dyn TradePublisher>>) {
        self.publisher = publisher;
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn fees(&self) -> &FeeCalculator {
        &self.fees
    }

    /// Append-only log of every trade this engine has executed.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    pub fn bbo(&self) -> Bbo {
        self.book.bbo()
    }

    pub fn l2_snapshot(&self, depth: usize) -> L2Snapshot {
        self.book.l2_snapshot(depth)
    }

    /// Dispatches one order by type and returns what it did.
    ///
    /// Timestamps are caller-supplied; regressions are clamped, never
    /// rejected.
    pub fn process_order(&mut self, order: Order) -> Result<Execution, EngineError> {
        self.validate(&order)?;
        self.last_timestamp = self.last_timestamp.max(order.timestamp);
        debug!(
            order_id = %order.order_id,
            side = ?order.side,
            order_type = ?order.order_type,
            quantity = order.original_quantity,
            "processing order"
        );
        let execution = match order.order_type {
            OrderType::Limit => self.process_limit_order(order),
            OrderType::Market => self.process_market_order(order),
            OrderType::Ioc => self.process_ioc_order(order),
            OrderType::Fok => self.process_fok_order(order),
        };
        Ok(execution)
    }

    /// Cancels a resting order. Returns true iff one was removed; unknown
    /// or terminal ids are a no-op.
    pub fn cancel_order(&mut self, order_id: &OrderId) -> bool {
        match self.book.cancel_order(order_id) {
            Some(order) => {
                debug!(order_id = %order.order_id, "order cancelled");
                true
            }
            None => false,
        }
    }

    fn validate(&self, order: &Order) -> Result<(), EngineError> {
        if order.status != OrderStatus::Created {
            return Err(EngineError::AlreadySubmitted(order.order_id.clone()));
        }
        if order.original_quantity == 0 || order.filled_quantity != 0 {
            return Err(EngineError::InvalidQuantity(order.order_id.clone()));
        }
        if order.order_type != OrderType::Market {
            match order.price {
                Some(price) if price > Decimal::ZERO => {}
                _ => return Err(EngineError::InvalidPrice(order.order_id.clone())),
            }
        }
        if self.book.order(&order.order_id).is_some() {
            return Err(EngineError::DuplicateOrderId(order.order_id.clone()));
        }
        Ok(())
    }

    fn process_limit_order(&mut self, mut order: Order) -> Execution {
        let trades = self.matching_loop(&mut order);
        let order_id = order.order_id.clone();
        let filled_quantity = order.filled_quantity;
        let remaining_quantity = order.remaining_quantity();

        let status = if order.is_filled() {
            order.status = OrderStatus::Completed;
            OrderStatus::Completed
        } else {
            let status = if filled_quantity > 0 {
                OrderStatus::PartiallyFilled
            } else {
                OrderStatus::Open
            };
            self.book.insert_limit(order);
            status
        };

        Execution {
            order_id,
            status,
            filled_quantity,
            remaining_quantity,
            trades,
        }
    }

    fn process_market_order(&mut self, order: Order) -> Execution {
        self.take_liquidity(order)
    }

    fn process_ioc_order(&mut self, order: Order) -> Execution {
        self.take_liquidity(order)
    }

    /// Shared market/IOC post-policy: never rests; no fills cancels, a
    /// partial fill terminates PartiallyFilled, a full fill completes.
    fn take_liquidity(&mut self, mut order: Order) -> Execution {
        let trades = self.matching_loop(&mut order);
        order.status = if order.filled_quantity == 0 {
            OrderStatus::Cancelled
        } else if order.remaining_quantity() > 0 {
            OrderStatus::PartiallyFilled
        } else {
            OrderStatus::Completed
        };
        debug_assert!(!order.is_resting());

        Execution {
            order_id: order.order_id,
            status: order.status,
            filled_quantity: order.filled_quantity,
            remaining_quantity: order.original_quantity - order.filled_quantity,
            trades,
        }
    }

    fn process_fok_order(&mut self, mut order: Order) -> Execution {
        if !self.book.can_fully_fill(&order) {
            order.status = OrderStatus::Cancelled;
            return Execution {
                order_id: order.order_id,
                status: OrderStatus::Cancelled,
                filled_quantity: 0,
                remaining_quantity: order.original_quantity,
                trades: Vec::new(),
            };
        }
        let trades = self.matching_loop(&mut order);
        debug_assert!(order.is_filled());
        order.status = OrderStatus::Completed;

        Execution {
            order_id: order.order_id,
            status: OrderStatus::Completed,
            filled_quantity: order.filled_quantity,
            remaining_quantity: 0,
            trades,
        }
    }

    /// The matching loop shared by every order type. Re-reads the best
    /// opposite level each iteration (the previous one may have been
    /// pruned), fills the oldest resting order at the maker's price, and
    /// stops when the taker is done, the opposite side is empty, or the
    /// limit price no longer crosses.
    fn matching_loop(&mut self, order: &mut Order) -> Vec<Trade> {
        let mut trades = Vec::new();
        while order.remaining_quantity() > 0 {
            let Some(level_price) = self.book.best_opposite(order.side).map(|l| l.price()) else {
                break;
            };
            if !order.crosses(level_price) {
                break;
            }
            let Some(fill) = self
                .book
                .fill_best_opposite(order.side, order.remaining_quantity())
            else {
                break;
            };
            order.fill(fill.quantity);
            let trade = self.build_trade(order, &fill);
            trace!(
                buy = %trade.buy_order_id,
                sell = %trade.sell_order_id,
                price = %trade.price,
                quantity = trade.quantity,
                "trade"
            );
            self.trades.push(trade.clone());
            if let Some(publisher) = &self.publisher {
                publisher.publish(&TradeEvent::from(&trade));
            }
            trades.push(trade);
        }
        trades
    }

    /// Builds one trade at the maker's price and applies fees. Volume counts
    /// toward both parties' tiers before rates are read, so an execution
    /// that crosses a threshold is charged at the new tier; self-matches
    /// (same user both sides) do not accrue volume.
    fn build_trade(&mut self, taker: &Order, fill: &Fill) -> Trade {
        let (buy_order_id, sell_order_id) = match taker.side {
            Side::Buy => (taker.order_id.clone(), fill.maker_order_id.clone()),
            Side::Sell => (fill.maker_order_id.clone(), taker.order_id.clone()),
        };

        let notional = fill.price * Decimal::from(fill.quantity);
        if taker.user_id != fill.maker_user_id {
            self.fees.update_volume(&fill.maker_user_id, notional);
            self.fees.update_volume(&taker.user_id, notional);
        }
        let maker_fee = self.fees.maker_fee(&fill.maker_user_id, fill.price, fill.quantity);
        let taker_fee = self.fees.taker_fee(&taker.user_id, fill.price, fill.quantity);

        Trade {
            user_id: taker.user_id.clone(),
            buy_order_id,
            sell_order_id,
            price: fill.price,
            quantity: fill.quantity,
            timestamp: taker.timestamp,
            maker_fee,
            taker_fee,
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}
