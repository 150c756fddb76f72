//! Proof-of-Stake ledger and validator selection

use crate::config::StakeConfig;
use crate::error::{ChainError, Result};
use crate::transaction::Address;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Stake deposited per identity.
///
/// An identity is present only while its stake is above zero. Entries are
/// kept in a `BTreeMap` so validator selection walks them in a fixed order.
#[derive(Debug, Clone)]
pub struct StakeLedger {
    stakers: BTreeMap<Address, u64>,
    min_stake: u64,
    base_reward: f64,
}

impl StakeLedger {
    pub fn new(config: &StakeConfig) -> Self {
        Self {
            stakers: BTreeMap::new(),
            min_stake: config.min_stake,
            base_reward: config.base_reward,
        }
    }

    pub fn stake_of(&self, identity: &str) -> u64 {
        self.stakers.get(identity).copied().unwrap_or(0)
    }

    /// Sum of all stakes. Deposits keep this within `u64`, so an overflow here
    /// means the ledger was corrupted.
    pub fn total_stake(&self) -> Result<u64> {
        self.stakers.iter().try_fold(0u64, |total, (identity, stake)| {
            total.checked_add(*stake).ok_or_else(|| ChainError::StakeOverflow {
                identity: identity.clone(),
                amount: *stake,
            })
        })
    }

    pub fn is_empty(&self) -> bool {
        self.stakers.is_empty()
    }

    /// Stakers in selection order.
    pub fn stakers(&self) -> impl Iterator<Item = (&Address, &u64)> {
        self.stakers.iter()
    }

    /// Add `amount` to `identity`'s stake. Each deposit must reach the minimum
    /// on its own. A deposit that would overflow the ledger total is rejected
    /// and leaves the ledger unchanged.
    pub fn deposit(&mut self, identity: &str, amount: u64) -> Result<()> {
        if amount < self.min_stake {
            return Err(ChainError::BelowMinimumStake {
                minimum: self.min_stake,
                offered: amount,
            });
        }
        if amount == 0 {
            return Ok(());
        }
        let overflow = || ChainError::StakeOverflow {
            identity: identity.to_string(),
            amount,
        };
        // Every stake is part of the total, so a total that fits means the
        // per-identity sum fits too.
        self.total_stake()?.checked_add(amount).ok_or_else(overflow)?;
        let updated = self.stake_of(identity).checked_add(amount).ok_or_else(overflow)?;

        self.stakers.insert(identity.to_string(), updated);
        info!("Staker {} staked {} tokens (total {})", identity, amount, updated);
        Ok(())
    }

    /// Remove `amount` from `identity`'s stake, dropping the entry when it
    /// reaches zero.
    pub fn withdraw(&mut self, identity: &str, amount: u64) -> Result<()> {
        let stake = match self.stakers.get_mut(identity) {
            Some(stake) if *stake >= amount => stake,
            Some(stake) => {
                return Err(ChainError::InsufficientStake(format!(
                    "{} has {} staked, cannot withdraw {}",
                    identity, stake, amount
                )))
            }
            None => {
                return Err(ChainError::InsufficientStake(format!(
                    "{} has no stake",
                    identity
                )))
            }
        };

        *stake -= amount;
        if *stake == 0 {
            self.stakers.remove(identity);
        }
        info!("Staker {} unstaked {} tokens", identity, amount);
        Ok(())
    }

    /// Pick a validator with probability proportional to stake.
    pub fn select_validator(&self) -> Result<Address> {
        self.select_validator_with(&mut rand::thread_rng())
    }

    /// Weighted selection driven by `rng`.
    ///
    /// Draws a point in `[0, total_stake)` and walks the stakers in order,
    /// accumulating stake until the running sum reaches the draw. If rounding
    /// lets the walk run off the end, the last staker is chosen.
    pub fn select_validator_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Address> {
        let (last, _) = self.stakers.iter().next_back().ok_or(ChainError::NoStakers)?;

        let total = self.total_stake()? as f64;
        let draw = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for (identity, stake) in &self.stakers {
            cumulative += *stake as f64;
            if cumulative >= draw {
                debug!("Selected validator {} (draw {:.3} of {})", identity, draw, total);
                return Ok(identity.clone());
            }
        }
        Ok(last.clone())
    }

    /// `base_reward * stake / 100`; zero for an identity without stake.
    pub fn reward(&self, identity: &str) -> f64 {
        self.base_reward * (self.stake_of(identity) as f64 / 100.0)
    }
}

impl Default for StakeLedger {
    fn default() -> Self {
        Self::new(&StakeConfig::default())
    }
}
