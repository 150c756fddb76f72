//! Error types for WorkChain

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ChainError {
    /// Mining was attempted before enough task certificates were pending.
    InsufficientCertificates { required: usize, available: usize },
    BelowMinimumStake { minimum: u64, offered: u64 },
    InsufficientStake(String),
    /// A deposit would push a stake or the ledger total past `u64::MAX`.
    StakeOverflow { identity: String, amount: u64 },
    NoStakers,
    MiningCancelled,
    MiningTimedOut,
    NonceExhausted,
    /// The blocking worker running a search panicked or was aborted.
    WorkerFailed(String),
    InvalidBlock(String),
    ConfigError(String),
    SerializationError(String),
    IoError(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::InsufficientCertificates { required, available } => write!(
                f,
                "Need at least {} task certificates to mine, {} pending",
                required, available
            ),
            ChainError::BelowMinimumStake { minimum, offered } => write!(
                f,
                "Stake must be at least {} tokens, got {}",
                minimum, offered
            ),
            ChainError::InsufficientStake(msg) => write!(f, "Insufficient stake: {}", msg),
            ChainError::StakeOverflow { identity, amount } => write!(
                f,
                "Depositing {} tokens for {} would overflow the stake ledger",
                amount, identity
            ),
            ChainError::NoStakers => write!(f, "No stakers available"),
            ChainError::MiningCancelled => write!(f, "Mining cancelled"),
            ChainError::MiningTimedOut => write!(f, "Mining deadline exceeded"),
            ChainError::NonceExhausted => write!(f, "Nonce space exhausted"),
            ChainError::WorkerFailed(msg) => write!(f, "Mining worker failed: {}", msg),
            ChainError::InvalidBlock(msg) => write!(f, "Invalid block: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::SerializationError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
