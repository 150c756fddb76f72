//! Interchangeable consensus strategies
//!
//! Both mechanisms answer the same two questions about the next block: who
//! authors it, and what that author earns. Proof-of-Work credits whoever ran
//! the search; Proof-of-Stake draws an author weighted by stake and ignores
//! the proposer.

use crate::error::Result;
use crate::stake::StakeLedger;
use crate::transaction::Address;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsensusKind {
    ProofOfWork,
    ProofOfStake,
}

pub trait Consensus {
    fn kind(&self) -> ConsensusKind;

    fn name(&self) -> &'static str {
        match self.kind() {
            ConsensusKind::ProofOfWork => "proof-of-work",
            ConsensusKind::ProofOfStake => "proof-of-stake",
        }
    }

    /// Choose the address credited with the next block.
    fn elect_author(&self, proposer: &str) -> Result<Address>;

    /// Reward the elected author earns under this mechanism.
    fn author_reward(&self, author: &str) -> f64;
}

/// Proof-of-Work: the proposer mines, and is paid the fixed mining reward.
#[derive(Debug, Clone, Copy)]
pub struct ProofOfWork {
    pub mining_reward: u64,
}

impl Consensus for ProofOfWork {
    fn kind(&self) -> ConsensusKind {
        ConsensusKind::ProofOfWork
    }

    fn elect_author(&self, proposer: &str) -> Result<Address> {
        Ok(proposer.to_string())
    }

    fn author_reward(&self, _author: &str) -> f64 {
        self.mining_reward as f64
    }
}

impl Consensus for StakeLedger {
    fn kind(&self) -> ConsensusKind {
        ConsensusKind::ProofOfStake
    }

    fn elect_author(&self, _proposer: &str) -> Result<Address> {
        self.select_validator()
    }

    fn author_reward(&self, author: &str) -> f64 {
        self.reward(author)
    }
}
