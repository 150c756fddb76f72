use crate::cache::BalanceCache;
use crate::certificate::TaskCertificate;
use crate::config::ChainConfig;
use crate::consensus::Consensus;
use crate::error::{ChainError, Result};
use crate::mempool::PendingPool;
use crate::miner::{mine_block, MiningControl};
use crate::transaction::{Address, Transaction};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::block::Block;
use super::state::BalanceProjector;
use super::validation::{validate_chain, ChainCorrupt};

/// Where the current (or last) mining attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningPhase {
    Idle,
    Gathering,
    Sealing,
    Searching,
    Appended,
    Rejected,
}

/// The ledger: sealed blocks plus the queues of work waiting to be sealed.
///
/// All methods take `&self`. Sealed blocks sit behind a read/write lock and a
/// block only becomes visible once it is fully mined and linked. The pending
/// queues have their own mutex, so submissions keep flowing while a
/// proof-of-work search is running. Mining attempts are serialized.
pub struct WorkChain {
    config: ChainConfig,
    blocks: RwLock<Vec<Block>>,
    pending: Mutex<PendingPool>,
    mining: Mutex<()>,
    phase: Mutex<MiningPhase>,
    balances: BalanceCache,
}

impl WorkChain {
    /// Create a chain holding only a freshly sealed genesis block.
    pub fn new(config: ChainConfig) -> Result<Self> {
        Self::from_blocks(config, vec![Block::genesis()?])
    }

    /// Rebuild a chain from previously sealed blocks.
    ///
    /// Only the shape is checked (non-empty, genesis first). Call
    /// [`verify`](Self::verify) to check hashes and linkage.
    pub fn from_blocks(config: ChainConfig, blocks: Vec<Block>) -> Result<Self> {
        config.validate()?;
        match blocks.first() {
            Some(first) if first.is_genesis() => {}
            Some(first) => {
                return Err(ChainError::InvalidBlock(format!(
                    "First block must be genesis (index 0), got index {}",
                    first.index
                )))
            }
            None => {
                return Err(ChainError::InvalidBlock(
                    "Cannot build a chain without a genesis block".to_string(),
                ))
            }
        }

        Ok(Self {
            config,
            blocks: RwLock::new(blocks),
            pending: Mutex::new(PendingPool::new()),
            mining: Mutex::new(()),
            phase: Mutex::new(MiningPhase::Idle),
            balances: BalanceCache::new(),
        })
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn latest_block(&self) -> Block {
        let blocks = self.blocks.read();
        // `from_blocks` guarantees at least the genesis block.
        blocks[blocks.len() - 1].clone()
    }

    /// Number of sealed blocks, genesis included.
    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }

    /// Snapshot of every sealed block.
    pub fn blocks(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.pending.lock().transactions().to_vec()
    }

    pub fn pending_certificates(&self) -> Vec<TaskCertificate> {
        self.pending.lock().certificates().cloned().collect()
    }

    pub fn phase(&self) -> MiningPhase {
        *self.phase.lock()
    }

    fn set_phase(&self, phase: MiningPhase) {
        *self.phase.lock() = phase;
    }

    /// Queue a transfer. No balance check: balances may go negative.
    pub fn submit_transaction(&self, from: impl Into<Address>, to: impl Into<Address>, amount: u64) {
        let tx = Transaction::new(from, to, amount);
        debug!("Transaction added: {} -> {} ({} tokens)", tx.from, tx.to, tx.amount);
        self.pending.lock().push_transaction(tx);
    }

    /// Queue a task certificate. Duplicate task ids are accepted.
    pub fn submit_certificate(&self, cert: TaskCertificate) {
        debug!("Task certificate added: Task ID {}", cert.task_id);
        self.pending.lock().push_certificate(cert);
    }

    /// Mine the next block with no deadline, crediting `miner_address`.
    pub fn mine(&self, miner_address: &str) -> Result<Block> {
        self.mine_with_control(miner_address, &MiningControl::new())
    }

    /// Mine the next block, crediting `miner_address` with the mining reward.
    ///
    /// A reward transaction is queued first. If fewer than
    /// `min_task_certificates_per_block` certificates are pending the attempt
    /// is rejected and, unless `rollback_reward_on_shortfall` is set, the
    /// reward stays queued. Otherwise the oldest required certificates and
    /// every pending transaction are sealed into a candidate block and
    /// searched for a valid nonce. If `control` stops the search, the taken
    /// items go back to the front of their queues.
    ///
    /// On success the whole pending-transaction queue is cleared, including
    /// transactions submitted while the search was running.
    pub fn mine_with_control(&self, miner_address: &str, control: &MiningControl) -> Result<Block> {
        let _mining = self.mining.lock();
        self.set_phase(MiningPhase::Gathering);

        let latest = self.latest_block();
        let required = self.config.min_task_certificates_per_block;

        let (transactions, certificates) = {
            let mut pending = self.pending.lock();
            pending.push_transaction(Transaction::reward(miner_address, self.config.mining_reward));

            let available = pending.certificate_count();
            if available < required {
                if self.config.rollback_reward_on_shortfall {
                    pending.pop_transaction();
                }
                drop(pending);
                self.set_phase(MiningPhase::Rejected);
                warn!(
                    "Mining rejected: need at least {} task certificates, {} pending",
                    required, available
                );
                return Err(ChainError::InsufficientCertificates { required, available });
            }

            self.set_phase(MiningPhase::Sealing);
            let certificates = pending.take_certificates(required);
            let transactions = pending.take_transactions();
            (transactions, certificates)
        };

        let index = latest.index + 1;
        let candidate = match Block::seal(index, transactions.clone(), certificates.clone(), latest.hash) {
            Ok(block) => block,
            Err(e) => {
                self.abandon(transactions, certificates);
                return Err(e);
            }
        };

        self.set_phase(MiningPhase::Searching);
        info!("Mining block #{}...", index);
        let sealed = match mine_block(candidate, self.config.difficulty, control) {
            Ok(block) => block,
            Err(e) => {
                warn!("Mining block #{} stopped: {}", index, e);
                self.abandon(transactions, certificates);
                return Err(e);
            }
        };

        {
            let mut blocks = self.blocks.write();
            blocks.push(sealed.clone());
            self.balances.invalidate_all();
        }
        self.pending.lock().clear_transactions();
        self.set_phase(MiningPhase::Appended);

        Ok(sealed)
    }

    fn abandon(&self, transactions: Vec<Transaction>, certificates: Vec<TaskCertificate>) {
        self.pending.lock().restore(transactions, certificates);
        self.set_phase(MiningPhase::Idle);
    }

    /// Mine on tokio's blocking pool, giving up after `timeout`.
    pub async fn mine_with_timeout(
        self: Arc<Self>,
        miner_address: impl Into<Address>,
        timeout: Duration,
    ) -> Result<Block> {
        let miner_address = miner_address.into();
        let control = MiningControl::with_timeout(timeout);
        tokio::task::spawn_blocking(move || self.mine_with_control(&miner_address, &control))
            .await
            .map_err(|e| ChainError::WorkerFailed(e.to_string()))?
    }

    /// Let `consensus` pick the block author from `proposer`, then mine the
    /// block crediting that author.
    pub fn produce_block(
        &self,
        consensus: &dyn Consensus,
        proposer: &str,
        control: &MiningControl,
    ) -> Result<Block> {
        let author = consensus.elect_author(proposer)?;
        debug!("{} elected {} as block author", consensus.name(), author);
        self.mine_with_control(&author, control)
    }

    /// Check hash integrity, linkage and certificate count of every block
    /// after genesis, stopping at the first violation.
    pub fn verify(&self) -> std::result::Result<(), ChainCorrupt> {
        let blocks = self.blocks.read();
        validate_chain(&blocks, self.config.min_task_certificates_per_block)
    }

    pub fn validate(&self) -> bool {
        match self.verify() {
            Ok(()) => true,
            Err(corrupt) => {
                warn!("{}", corrupt);
                false
            }
        }
    }

    /// Net balance of `address` over every sealed transaction.
    pub fn balance_of(&self, address: &str) -> i128 {
        // Hold the read lock until the cache is filled so an append cannot
        // invalidate in between and leave a stale entry behind.
        let blocks = self.blocks.read();
        if let Some(balance) = self.balances.get_balance(address) {
            return balance;
        }
        let balance = BalanceProjector::balance_of(&blocks, address);
        self.balances.set(address.to_string(), balance);
        balance
    }

    /// Net balance of every address seen in a sealed transaction.
    pub fn balances(&self) -> BTreeMap<Address, i128> {
        BalanceProjector::balances(&self.blocks.read())
    }
}
