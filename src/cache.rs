//! Caching layer for derived chain data
//!
//! Balances are a pure projection of the sealed blocks, so cached values stay
//! correct until the next block is appended. The chain invalidates the whole
//! cache while it still holds the write lock for the append.
use crate::transaction::Address;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe cache of projected balances keyed by address.
#[derive(Debug, Default)]
pub struct BalanceCache {
    balances: RwLock<HashMap<Address, i128>>,
}

impl BalanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get cached balance for address
    pub fn get_balance(&self, address: &str) -> Option<i128> {
        self.balances.read().get(address).copied()
    }

    pub fn set(&self, address: Address, balance: i128) {
        self.balances.write().insert(address, balance);
    }

    pub fn invalidate_all(&self) {
        self.balances.write().clear();
    }
}
