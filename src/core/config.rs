// Copyright (c) 2026 Amunchain
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! TOML configuration for the exchanger and the PoS miner.
//!
//! Every field except the network section has a default, so a minimal file
//! only names the network and its LP account address.

use crate::core::error::ErrorKind;
use crate::core::types::{NetworkAddresses, NetworkType, COIN};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("read config")]
    Read,
    /// File is not valid TOML or misses required fields.
    #[error("parse config: {0}")]
    Parse(String),
    /// A value is out of range.
    #[error("invalid config value: {0}")]
    Invalid(&'static str),
}

impl ConfigError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::Read => ErrorKind::ExternalFailure,
            ConfigError::Parse(_) => ErrorKind::ParseError,
            ConfigError::Invalid(_) => ErrorKind::DomainError,
        }
    }
}

/// Configuration root.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DexConfig {
    /// Network settings.
    pub network: NetworkConfig,
    /// Exchanger settings.
    #[serde(default)]
    pub exchange: ExchangeConfig,
    /// PoS miner settings.
    #[serde(default)]
    pub mining: MiningConfig,
}

/// Network settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// mainnet, testnet or stagenet.
    pub network: NetworkType,
    /// Address of the LP account.
    pub lp_account_address: String,
}

/// Exchanger settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Blocks to wait for a pending round before re-quoting.
    pub blocks_between_rounds: u64,
    /// Round budget when the caller does not give one.
    pub default_max_rounds: u32,
    /// Slippage bound (fraction) when the caller does not give one.
    pub default_max_slippage: f64,
    /// Ring size minus one for exchange transactions.
    pub default_fake_outs: usize,
    /// Pool interest in parts per thousand.
    pub pool_interest: u32,
    /// Capacity of the exchanger command queue.
    pub event_queue_depth: usize,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            blocks_between_rounds: 5,
            default_max_rounds: 10,
            default_max_slippage: 0.05,
            default_fake_outs: 15,
            pool_interest: 3,
            event_queue_depth: 64,
        }
    }
}

/// PoS miner settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Chain-head poll period.
    pub poll_interval_ms: u64,
    /// How long before the computed block time the block is assembled.
    pub block_assembly_lead_ms: u64,
    /// Confirmations an output needs before it may stake.
    pub stake_maturity_blocks: u64,
    /// Smallest stakeable output.
    pub min_stake_amount: u64,
    /// Amount at which stake weight starts to flatten.
    pub stake_knee: u64,
    /// Capacity of the miner event queue.
    pub event_queue_depth: usize,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            block_assembly_lead_ms: 500,
            stake_maturity_blocks: 20,
            min_stake_amount: COIN,
            stake_knee: 1_000 * COIN,
            event_queue_depth: 64,
        }
    }
}

impl DexConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|_| ConfigError::Read)?;
        Self::from_toml_str(&raw)
    }

    /// Parse from a TOML document.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: DexConfig = toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.network.lp_account_address.is_empty() {
            return Err(ConfigError::Invalid("network.lp_account_address"));
        }
        if self.exchange.pool_interest > 1_000 {
            return Err(ConfigError::Invalid("exchange.pool_interest"));
        }
        if !(0.0..=1.0).contains(&self.exchange.default_max_slippage) {
            return Err(ConfigError::Invalid("exchange.default_max_slippage"));
        }
        if self.exchange.event_queue_depth == 0 || self.mining.event_queue_depth == 0 {
            return Err(ConfigError::Invalid("event_queue_depth"));
        }
        if self.mining.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("mining.poll_interval_ms"));
        }
        if self.mining.stake_knee == 0 {
            return Err(ConfigError::Invalid("mining.stake_knee"));
        }
        Ok(())
    }

    /// The network's well-known addresses.
    pub fn network_addresses(&self) -> NetworkAddresses {
        NetworkAddresses {
            network: self.network.network,
            lp_account_address: self.network.lp_account_address.clone(),
        }
    }
}
