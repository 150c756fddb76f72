/// Transaction types for WorkChain
use serde::{Deserialize, Serialize};

/// Participant identity. Any string; the chain does not interpret it.
pub type Address = String;

/// Sender used for block rewards minted by the network.
pub const NETWORK_ADDRESS: &str = "network";

/// A plain ledger entry moving `amount` from one address to another.
///
/// There is no signature and no per-account nonce; balances are derived by
/// folding over every sealed transaction and may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Address,
    pub to: Address,
    pub amount: u64,
}

impl Transaction {
    pub fn new(from: impl Into<Address>, to: impl Into<Address>, amount: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Synthetic reward paid by the network to a block author.
    pub fn reward(beneficiary: impl Into<Address>, amount: u64) -> Self {
        Self::new(NETWORK_ADDRESS, beneficiary, amount)
    }

    /// Signed effect of this transaction on `address`'s balance.
    pub fn net_effect(&self, address: &str) -> i128 {
        let mut delta = 0i128;
        if self.from == address {
            delta -= self.amount as i128;
        }
        if self.to == address {
            delta += self.amount as i128;
        }
        delta
    }
}
