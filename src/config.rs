//! Configuration management for WorkChain

use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Length of a hex-encoded SHA-256 digest; no difficulty can exceed it.
pub const MAX_DIFFICULTY: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub stake: StakeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Required number of leading `'0'` hex characters in a block hash.
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,
    #[serde(default = "default_min_task_certificates")]
    pub min_task_certificates_per_block: usize,
    #[serde(default = "default_mining_reward")]
    pub mining_reward: u64,
    /// Drop the queued reward transaction again when a mining attempt is
    /// rejected for lack of certificates. Off by default, so repeated
    /// failures accumulate reward transactions.
    #[serde(default)]
    pub rollback_reward_on_shortfall: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            min_task_certificates_per_block: default_min_task_certificates(),
            mining_reward: default_mining_reward(),
            rollback_reward_on_shortfall: false,
        }
    }
}

impl ChainConfig {
    pub fn validate(&self) -> Result<()> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ChainError::ConfigError(format!(
                "chain.difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.difficulty
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeConfig {
    #[serde(default = "default_min_stake")]
    pub min_stake: u64,
    /// Base reward per block, scaled by stake / 100.
    #[serde(default = "default_base_reward")]
    pub base_reward: f64,
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            min_stake: default_min_stake(),
            base_reward: default_base_reward(),
        }
    }
}

impl StakeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.base_reward.is_finite() || self.base_reward < 0.0 {
            return Err(ChainError::ConfigError(format!(
                "stake.base_reward must be a non-negative number, got {}",
                self.base_reward
            )));
        }
        Ok(())
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.chain.validate()?;
        self.stake.validate()
    }
}

fn default_difficulty() -> usize {
    4
}

fn default_min_task_certificates() -> usize {
    5
}

fn default_mining_reward() -> u64 {
    5
}

fn default_min_stake() -> u64 {
    10
}

fn default_base_reward() -> f64 {
    2.0
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config: Config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        Config::default()
    };

    config.validate()?;
    Ok(config)
}
