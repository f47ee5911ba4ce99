//! # Matchbook
//!
//! Single-instrument, price-time-priority continuous matching engine:
//! a two-sided order book with FIFO price levels, four order-type
//! disciplines (limit, market, immediate-or-cancel, fill-or-kill), tiered
//! maker/taker fees, trade publication, and market-data snapshots.
//!
//! ## Entry point
//!
//! Use [`MatchingEngine`] as the single entry point: create with
//! [`MatchingEngine::new`], then [`MatchingEngine::process_order`] and
//! [`MatchingEngine::cancel_order`]. Read-only views come from
//! [`MatchingEngine::bbo`] and [`MatchingEngine::l2_snapshot`].
//!
//! ## Example
//!
//! ```rust
//! use matchbook::{MatchingEngine, Order, OrderStatus, Side};
//! use rust_decimal::Decimal;
//!
//! let mut engine = MatchingEngine::new();
//! let sell = Order::limit("alice", "s1", Side::Sell, Decimal::from(101), 5, 1);
//! engine.process_order(sell).unwrap();
//!
//! let buy = Order::limit("bob", "b1", Side::Buy, Decimal::from(101), 3, 2);
//! let execution = engine.process_order(buy).unwrap();
//! assert_eq!(execution.status, OrderStatus::Completed);
//! assert_eq!(execution.trades.len(), 1);
//! assert_eq!(execution.trades[0].price, Decimal::from(101));
//! ```
//!
//! ## Concurrency model
//!
//! The engine is single-writer and synchronous: one logical actor submits
//! events serially and every mutation happens before the call returns.
//! Parallel ingress must be serialized externally; the `api` module does
//! this with a mutex.

pub mod api;
pub mod engine;
pub mod execution;
pub mod fees;
pub mod market_data_gen;
pub mod order;
pub mod order_book;
pub mod price_level;
pub mod publisher;
pub mod types;

pub use engine::{EngineError, MatchingEngine};
pub use execution::{Execution, Trade, TradeEvent};
pub use fees::{default_fee_tiers, FeeCalculator, FeeTier, UserFeeState};
pub use order::Order;
pub use order_book::{Fill, OrderBook};
pub use price_level::PriceLevel;
pub use publisher::{
    BroadcastTradePublisher, InMemoryTradePublisher, LogTradePublisher, TradePublisher,
};
pub use types::{Bbo, L2Level, L2Snapshot, OrderId, OrderStatus, OrderType, Quote, Side, UserId};
