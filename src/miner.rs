//! Proof-of-work search
//!
//! Increments the block nonce until the hex hash starts with `difficulty`
//! zero characters. The search is sequential and unbounded, so every call
//! takes a [`MiningControl`] that the host can use to abort it or give it a
//! deadline.

use crate::blockchain::Block;
use crate::crypto::meets_difficulty;
use crate::error::{ChainError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Nonces tried between checks of the cancel flag and deadline.
const CONTROL_CHECK_INTERVAL: u64 = 1024;

/// Cancellation handle for a running proof-of-work search.
///
/// Clones share the same cancel flag, so one clone can be handed to the
/// miner while another stays with whoever may need to abort it.
#[derive(Debug, Clone, Default)]
pub struct MiningControl {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl MiningControl {
    /// A control with no deadline that only stops on [`cancel`](Self::cancel).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new().deadline(Instant::now() + timeout)
    }

    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Error to abort with, if the search must stop now.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ChainError::MiningCancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(ChainError::MiningTimedOut),
            _ => Ok(()),
        }
    }
}

/// Search for a nonce that gives `block` a hash with `difficulty` leading
/// zeros. Returns the sealed block, or the control's error if it is
/// cancelled or times out first.
pub fn mine_block(mut block: Block, difficulty: usize, control: &MiningControl) -> Result<Block> {
    debug!("Mining block #{} at difficulty {}", block.index, difficulty);
    let start = Instant::now();
    let mut attempts: u64 = 0;

    control.check()?;
    while !meets_difficulty(&block.hash, difficulty) {
        attempts += 1;
        if attempts % CONTROL_CHECK_INTERVAL == 0 {
            control.check()?;
        }
        block.nonce = block.nonce.checked_add(1).ok_or(ChainError::NonceExhausted)?;
        block.rehash()?;
    }

    let elapsed = start.elapsed();
    let hash_rate = attempts as f64 / elapsed.as_secs_f64().max(f64::EPSILON);
    info!(
        "Block #{} mined! Hash: {} (nonce {}, {:.2}s, {:.0} H/s)",
        block.index,
        block.hash,
        block.nonce,
        elapsed.as_secs_f64(),
        hash_rate
    );
    Ok(block)
}
