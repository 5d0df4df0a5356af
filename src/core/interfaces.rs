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

//! Collaborators consumed by the DEX core and the PoS miner.
//!
//! Daemon and wallet access is async (`async_trait`); the token registry and
//! the hash primitive are plain synchronous lookups.

use crate::core::error::ErrorKind;
use crate::core::types::{
    ChainHead, CompositeTransfer, LiquidityPool, MiningInfo, PendingTransaction, StakeDetails,
    TokenId, TransferLeg, WalletOutput, H256,
};
use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a daemon or wallet collaborator.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Daemon unreachable.
    #[error("network error")]
    Network,
    /// Daemon is busy (syncing).
    #[error("daemon busy")]
    Busy,
    /// Daemon answered with an error status.
    #[error("rpc error: {0}")]
    Rpc(String),
    /// Requested object does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// Transaction construction failed.
    #[error("build failed: {0}")]
    Build(String),
    /// Relaying a transaction failed.
    #[error("commit failed: {0}")]
    Commit(String),
    /// Wallet is locked or otherwise unable to sign.
    #[error("wallet unavailable")]
    WalletUnavailable,
}

impl CollaboratorError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::ExternalFailure
    }
}

/// Token metadata lookups.
pub trait TokenRegistry: Send + Sync {
    /// Display name of a token.
    fn token_id_to_name(&self, id: TokenId) -> Option<String>;
    /// Token for a display name.
    fn name_to_id(&self, name: &str) -> Option<TokenId>;
    /// True for the chain's native coin.
    fn is_native_coin(&self, id: TokenId) -> bool;
}

/// Read access to the daemon's view of the chain.
#[async_trait]
pub trait ChainState: Send + Sync {
    /// Current state of the pool with the given canonical name.
    async fn get_pool(&self, name: &str) -> Result<LiquidityPool, CollaboratorError>;
    /// Height and hash of the top block.
    async fn get_chain_head(&self) -> Result<ChainHead, CollaboratorError>;
    /// Mining parameters for the next block.
    async fn get_mining_info(&self) -> Result<MiningInfo, CollaboratorError>;
}

/// The local wallet.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Unspent outputs owned by the wallet.
    async fn list_unspent_outputs(&self) -> Result<Vec<WalletOutput>, CollaboratorError>;
    /// True if the output can be spent right now.
    fn is_unlocked(&self, output: &WalletOutput) -> bool;
    /// Primary address of a subaddress account.
    fn address(&self, subaddress_account: u32) -> String;
    /// Build (but do not relay) the transactions realising `transfer`.
    async fn build_exchange_transactions(
        &self,
        subaddress_account: u32,
        transfer: &CompositeTransfer,
        legs: &[TransferLeg],
        fake_outs: usize,
    ) -> Result<Vec<PendingTransaction>, CollaboratorError>;
    /// Relay a built transaction.
    async fn commit(&self, tx: &PendingTransaction) -> Result<(), CollaboratorError>;
    /// Assemble, sign and submit a PoS block for `details`.
    async fn build_and_submit_pos_block(
        &self,
        details: &StakeDetails,
        reward_address: &str,
    ) -> Result<H256, CollaboratorError>;
}

/// The chain's fast hash primitive.
pub trait FastHash: Send + Sync {
    /// Hash `data`.
    fn fast_hash(&self, data: &[u8]) -> H256;
}
