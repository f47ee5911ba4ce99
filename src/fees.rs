//! Tiered maker/taker fee schedule with per-user volume tracking.
//!
//! Each tier sets a cumulative-notional threshold and a pair of rates.
//! Maker rates may be negative (rebates); taker rates are non-negative.
//! A user's tier index only ever moves up.

use crate::types::UserId;
use rust_decimal::Decimal;
use std::collections::HashMap;

/// One fee bracket: active once a user's rolling volume reaches `min_volume`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeeTier {
    pub min_volume: Decimal,
    pub maker_rate: Decimal,
    pub taker_rate: Decimal,
}

/// The standard schedule: base tier pays the full taker rate, the upper two
/// tiers rebate makers.
pub fn default_fee_tiers() -> Vec<FeeTier> {
    vec![
        FeeTier {
            min_volume: Decimal::ZERO,
            maker_rate: Decimal::ZERO,
            taker_rate: Decimal::new(5, 4), // 0.0005
        },
        FeeTier {
            min_volume: Decimal::from(100_000),
            maker_rate: Decimal::new(-1, 4), // -0.0001
            taker_rate: Decimal::new(4, 4),  // 0.0004
        },
        FeeTier {
            min_volume: Decimal::from(1_000_000),
            maker_rate: Decimal::new(-2, 4), // -0.0002
            taker_rate: Decimal::new(3, 4),  // 0.0003
        },
    ]
}

/// Per-user rolling notional and current tier. Created on first observation.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UserFeeState {
    pub rolling_volume: Decimal,
    pub tier_index: usize,
}

/// Rate lookup and volume accounting, keyed by user id.
#[derive(Clone, Debug)]
pub struct FeeCalculator {
    tiers: Vec<FeeTier>,
    users: HashMap<UserId, UserFeeState>,
}

impl FeeCalculator {
    /// Builds a calculator from a schedule ordered by ascending threshold,
    /// with the first threshold at zero.
    pub fn new(tiers: Vec<FeeTier>) -> Self {
        debug_assert!(!tiers.is_empty());
        debug_assert_eq!(tiers[0].min_volume, Decimal::ZERO);
        debug_assert!(tiers.windows(2).all(|w| w[0].min_volume < w[1].min_volume));
        Self {
            tiers,
            users: HashMap::new(),
        }
    }

    /// Adds executed notional to the user's rolling volume and promotes the
    /// tier while the next threshold is met. Never demotes.
    pub fn update_volume(&mut self, user_id: &UserId, notional: Decimal) {
        let state = self.users.entry(user_id.clone()).or_default();
        state.rolling_volume += notional;
        while state.tier_index + 1 < self.tiers.len()
            && state.rolling_volume >= self.tiers[state.tier_index + 1].min_volume
        {
            state.tier_index += 1;
        }
    }

    /// Current tier for a user; unseen users get the base tier.
    pub fn tier_for(&self, user_id: &UserId) -> &FeeTier {
        let index = self.tier_index_for(user_id);
        &self.tiers[index]
    }

    pub fn tier_index_for(&self, user_id: &UserId) -> usize {
        self.users.get(user_id).map_or(0, |state| state.tier_index)
    }

    pub fn rolling_volume(&self, user_id: &UserId) -> Decimal {
        self.users
            .get(user_id)
            .map_or(Decimal::ZERO, |state| state.rolling_volume)
    }

    /// Maker fee for an execution of `quantity` at `price`. Negative values
    /// are rebates.
    pub fn maker_fee(&self, user_id: &UserId, price: Decimal, quantity: u64) -> Decimal {
        price * Decimal::from(quantity) * self.tier_for(user_id).maker_rate
    }

    /// Taker fee for an execution of `quantity` at `price`.
    pub fn taker_fee(&self, user_id: &UserId, price: Decimal, quantity: u64) -> Decimal {
        price * Decimal::from(quantity) * self.tier_for(user_id).taker_rate
    }
}

impl Default for FeeCalculator {
    fn default() -> Self {
        Self::new(default_fee_tiers())
    }
}
