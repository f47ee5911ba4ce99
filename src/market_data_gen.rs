//! Deterministic synthetic order flow.
//!
//! Configurable stream of limit/market/IOC/FOK orders for replay tests and
//! benchmarks. Same seed and config produce the same sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::order::Order;
use crate::types::Side;

/// Configuration for the synthetic order generator. Ranges are inclusive.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed produces the same order stream.
    pub seed: u64,
    /// Number of orders produced by [`Generator::all_orders`].
    pub num_orders: usize,
    /// Probability of Buy; Sell otherwise.
    pub buy_ratio: f64,
    /// Probability of a Limit order.
    pub limit_ratio: f64,
    /// Probability of an IOC order (drawn after limit).
    pub ioc_ratio: f64,
    /// Probability of a FOK order (drawn after IOC); the remainder is Market.
    pub fok_ratio: f64,
    /// Limit-price range for priced orders.
    pub price_min: i64,
    pub price_max: i64,
    /// Quantity range, whole units.
    pub quantity_min: u64,
    pub quantity_max: u64,
    /// Number of distinct users ("u1".."uN").
    pub num_users: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_orders: 1000,
            buy_ratio: 0.5,
            limit_ratio: 0.8,
            ioc_ratio: 0.1,
            fok_ratio: 0.05,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
            num_users: 5,
        }
    }
}

/// Deterministic order stream. Timestamps are the 1-based sequence number,
/// order ids are `o-<seq>`.
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_seq: u64,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            next_seq: 0,
        }
    }

    pub fn next_order(&mut self) -> Order {
        self.next_seq += 1;
        let seq = self.next_seq;
        let config = &self.config;

        let side = if self.rng.gen_bool(config.buy_ratio) {
            Side::Buy
        } else {
            Side::Sell
        };
        let user = format!("u{}", self.rng.gen_range(1..=config.num_users));
        let order_id = format!("o-{seq}");
        let quantity = self.rng.gen_range(config.quantity_min..=config.quantity_max);
        let price = Decimal::from(self.rng.gen_range(config.price_min..=config.price_max));

        let roll: f64 = self.rng.gen();
        if roll < config.limit_ratio {
            Order::limit(user.as_str(), order_id.as_str(), side, price, quantity, seq)
        } else if roll < config.limit_ratio + config.ioc_ratio {
            Order::ioc(user.as_str(), order_id.as_str(), side, price, quantity, seq)
        } else if roll < config.limit_ratio + config.ioc_ratio + config.fok_ratio {
            Order::fok(user.as_str(), order_id.as_str(), side, price, quantity, seq)
        } else {
            Order::market(user.as_str(), order_id.as_str(), side, quantity, seq)
        }
    }

    /// Produces `config.num_orders` orders.
    pub fn all_orders(mut self) -> Vec<Order> {
        (0..self.config.num_orders).map(|_| self.next_order()).collect()
    }
}
