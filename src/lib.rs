//! WorkChain - a task-certified blockchain with interchangeable consensus
//!
//! Blocks can only be sealed once enough off-chain task certificates are
//! pending. Sealing runs a Proof-of-Work search; a separate Proof-of-Stake
//! ledger can elect block authors instead.
//!
//! # Architecture
//!
//! ## Core Blockchain
//! - [`blockchain`] - Blocks, the chain, validation and balance projection
//! - [`transaction`] - Ledger entries
//! - [`certificate`] - Task-completion certificates and their issuer
//! - [`mempool`] - Pending transactions and certificates
//!
//! ## Consensus
//! - [`miner`] - Cancellable proof-of-work search
//! - [`stake`] - Stake ledger and weighted validator selection
//! - [`consensus`] - Common interface over both mechanisms
//!
//! ## Utilities
//! - [`crypto`] - SHA-256 and canonical JSON hashing
//! - [`cache`] - Balance cache
//! - [`config`] - Configuration management
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod certificate;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;
pub mod stake;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;

pub use blockchain::{Block, ChainCorrupt, MiningPhase, Violation, WorkChain};
pub use certificate::{CertificateIssuer, TaskCertificate, TaskValidator};
pub use consensus::{Consensus, ConsensusKind, ProofOfWork};
pub use error::ChainError;
pub use miner::MiningControl;
pub use stake::StakeLedger;
pub use transaction::Transaction;
