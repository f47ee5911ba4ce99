//! Core types and ids for the matching engine.
//!
//! Identifiers are newtype wrappers over the strings the submitter supplies.
//! [`Side`], [`OrderType`], and [`OrderStatus`] define the order message and
//! lifecycle; [`Bbo`] and [`L2Snapshot`] are the market-data value types.

use rust_decimal::Decimal;
use std::fmt;

/// Identifier of the submitting user. Fee state is keyed by this.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct UserId(pub String);

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_owned())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique order identifier. Unique for the engine's lifetime; present in the
/// book index exactly while the order is resting.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub String);

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        OrderId(s.to_owned())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order type discipline. Limit may rest; the other three never do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderType {
    /// Match what crosses, rest the remainder.
    Limit,
    /// Take best available liquidity regardless of price; never rests.
    Market,
    /// Immediate-or-cancel: match up to the limit price, cancel the rest.
    Ioc,
    /// Fill-or-kill: fill entirely immediately or cancel with no fills.
    Fok,
}

/// Order lifecycle status. Completed and Cancelled are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    Created,
    Open,
    PartiallyFilled,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

/// One side of the top of book: best price and the level's aggregate quantity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Quote {
    pub price: Decimal,
    pub quantity: u64,
}

/// Best bid and offer. A side is `None` when its ladder is empty.
#[derive(Clone, Copy, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Bbo {
    pub bid: Option<Quote>,
    pub ask: Option<Quote>,
}

impl fmt::Display for Bbo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "BBO:")?;
        match self.bid {
            Some(q) => writeln!(f, "Bid: {} x {}", q.price, q.quantity)?,
            None => writeln!(f, "Bid: none")?,
        }
        match self.ask {
            Some(q) => write!(f, "Ask: {} x {}", q.price, q.quantity)?,
            None => write!(f, "Ask: none")?,
        }
        Ok(())
    }
}

/// One aggregated depth level: price and total resting quantity.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct L2Level {
    pub price: Decimal,
    pub quantity: u64,
}

/// Aggregated depth snapshot: bids in descending price order, asks ascending.
/// Never contains empty levels.
#[derive(Clone, Debug, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct L2Snapshot {
    pub bids: Vec<L2Level>,
    pub asks: Vec<L2Level>,
}

impl fmt::Display for L2Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "L2 Snapshot")?;
        writeln!(f, "Bids:")?;
        if self.bids.is_empty() {
            writeln!(f, "  none")?;
        }
        for level in &self.bids {
            writeln!(f, "  {} x {}", level.price, level.quantity)?;
        }
        writeln!(f, "Asks:")?;
        if self.asks.is_empty() {
            write!(f, "  none")?;
        }
        for level in &self.asks {
            writeln!(f, "  {} x {}", level.price, level.quantity)?;
        }
        Ok(())
    }
}
