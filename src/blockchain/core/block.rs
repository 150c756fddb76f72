use crate::certificate::TaskCertificate;
use crate::crypto::{canonical_hash, Hash};
use crate::error::Result;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// `previous_hash` of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// The fields covered by a block's hash, in borrowed form.
#[derive(Serialize)]
struct SealedFields<'a> {
    index: u64,
    timestamp: u64,
    transactions: &'a [Transaction],
    task_certificates: &'a [TaskCertificate],
    previous_hash: &'a str,
    nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    /// Seal time in milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub transactions: Vec<Transaction>,
    pub task_certificates: Vec<TaskCertificate>,
    pub previous_hash: Hash,
    pub nonce: u64,
    pub hash: Hash,
}

impl Block {
    /// Build a block stamped with the current time and nonce 0, with its hash
    /// already computed.
    pub fn seal(
        index: u64,
        transactions: Vec<Transaction>,
        task_certificates: Vec<TaskCertificate>,
        previous_hash: Hash,
    ) -> Result<Self> {
        let timestamp = chrono::Utc::now().timestamp_millis() as u64;
        let mut block = Block {
            index,
            timestamp,
            transactions,
            task_certificates,
            previous_hash,
            nonce: 0,
            hash: String::new(),
        };
        block.rehash()?;
        Ok(block)
    }

    pub fn genesis() -> Result<Self> {
        Self::seal(0, Vec::new(), Vec::new(), GENESIS_PREVIOUS_HASH.to_string())
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }

    /// Hash of the sealed fields. Pure: depends on nothing but the block's
    /// own contents, and ignores the stored `hash`.
    pub fn compute_hash(&self) -> Result<Hash> {
        canonical_hash(&SealedFields {
            index: self.index,
            timestamp: self.timestamp,
            transactions: &self.transactions,
            task_certificates: &self.task_certificates,
            previous_hash: &self.previous_hash,
            nonce: self.nonce,
        })
    }

    /// Refresh the stored hash after a sealed field (normally `nonce`) changed.
    pub fn rehash(&mut self) -> Result<()> {
        self.hash = self.compute_hash()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block::seal(
            1,
            vec![Transaction::new("Alice", "Bob", 50)],
            vec![TaskCertificate {
                task_id: "task_0".to_string(),
                user_address: "Alice".to_string(),
                timestamp: 1,
                signature: "ab".to_string(),
            }],
            "00ff".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_genesis_shape() {
        let genesis = Block::genesis().unwrap();
        assert_eq!(genesis.index, 0);
        assert!(genesis.transactions.is_empty());
        assert!(genesis.task_certificates.is_empty());
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.hash, genesis.compute_hash().unwrap());
    }

    #[test]
    fn test_hash_is_lowercase_hex() {
        let block = sample_block();
        assert_eq!(block.hash.len(), 64);
        assert!(block.hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_compute_hash_is_deterministic() {
        let block = sample_block();
        assert_eq!(block.compute_hash().unwrap(), block.compute_hash().unwrap());
        assert_eq!(block.clone().compute_hash().unwrap(), block.hash);
    }

    #[test]
    fn test_hash_survives_json_round_trip() {
        let block = sample_block();
        let json = serde_json::to_string(&block).unwrap();
        let restored: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, block);
        assert_eq!(restored.compute_hash().unwrap(), block.hash);
    }

    #[test]
    fn test_nonce_change_requires_rehash() {
        let mut block = sample_block();
        let original = block.hash.clone();
        block.nonce += 1;
        assert_eq!(block.hash, original);
        assert_ne!(block.compute_hash().unwrap(), original);

        block.rehash().unwrap();
        assert_ne!(block.hash, original);
        assert_eq!(block.hash, block.compute_hash().unwrap());
    }

    #[test]
    fn test_stored_hash_not_part_of_digest() {
        let mut block = sample_block();
        let expected = block.compute_hash().unwrap();
        block.hash = "tampered".to_string();
        assert_eq!(block.compute_hash().unwrap(), expected);
    }
}
