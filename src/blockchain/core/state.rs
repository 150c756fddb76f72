use super::block::Block;
use crate::transaction::Address;
use std::collections::BTreeMap;

/// Read-only projection of net balances from sealed transactions.
///
/// Nothing is stored: every query folds over the blocks it is handed.
/// Reward transactions from the network count like any other sender, so the
/// network address carries the negative of everything ever minted.
pub struct BalanceProjector;

impl BalanceProjector {
    /// Net balance of `address`: everything received minus everything sent.
    pub fn balance_of(blocks: &[Block], address: &str) -> i128 {
        blocks
            .iter()
            .flat_map(|block| block.transactions.iter())
            .map(|tx| tx.net_effect(address))
            .sum()
    }

    /// Net balance of every address that appears in any transaction.
    pub fn balances(blocks: &[Block]) -> BTreeMap<Address, i128> {
        let mut balances = BTreeMap::new();
        for tx in blocks.iter().flat_map(|block| block.transactions.iter()) {
            *balances.entry(tx.from.clone()).or_insert(0) -= tx.amount as i128;
            *balances.entry(tx.to.clone()).or_insert(0) += tx.amount as i128;
        }
        balances
    }
}
