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

#![allow(dead_code)]

use amunchain_dex::core::dex::naming::StaticTokenRegistry;
use amunchain_dex::core::interfaces::{ChainState, CollaboratorError, Wallet};
use amunchain_dex::core::types::{
    AmountRatio, ChainHead, CompositeTransfer, LiquidityPool, MiningInfo, NetworkAddresses,
    NetworkType, PendingTransaction, StakeDetails, TokenId, TransferLeg, TxId, WalletOutput, H256,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

pub const AMUN: TokenId = TokenId(0);
pub const ZED: TokenId = TokenId(1);
pub const ABC: TokenId = TokenId(2);
pub const QRS: TokenId = TokenId(3);

pub fn registry() -> StaticTokenRegistry {
    let mut r = StaticTokenRegistry::new(AMUN, "AMUN");
    r.register(ZED, "ZED").unwrap();
    r.register(ABC, "ABC").unwrap();
    r.register(QRS, "QRS").unwrap();
    r
}

pub fn addresses() -> NetworkAddresses {
    NetworkAddresses {
        network: NetworkType::Testnet,
        lp_account_address: "lp-account".to_string(),
    }
}

pub fn pool(lp: u64, token1: TokenId, token2: TokenId, a1: u64, a2: u64) -> LiquidityPool {
    LiquidityPool {
        lp_token: TokenId(lp),
        token1,
        token2,
        lp_supply: 1_000,
        ratio: AmountRatio::new(a1, a2),
    }
}

pub fn h(n: u8) -> H256 {
    H256::from_bytes([n; 32])
}

#[derive(Default)]
pub struct MockChain {
    pub pools: Mutex<BTreeMap<String, LiquidityPool>>,
    pub head: Mutex<Option<ChainHead>>,
    pub info: Mutex<Option<MiningInfo>>,
    pub offline: AtomicBool,
}

impl MockChain {
    pub fn set_pool(&self, name: &str, pool: LiquidityPool) {
        self.pools.lock().insert(name.to_string(), pool);
    }

    pub fn set_head(&self, height: u64, hash: H256) {
        *self.head.lock() = Some(ChainHead { height, hash });
    }

    pub fn set_info(&self, info: MiningInfo) {
        *self.info.lock() = Some(info);
    }
}

#[async_trait]
impl ChainState for MockChain {
    async fn get_pool(&self, name: &str) -> Result<LiquidityPool, CollaboratorError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Network);
        }
        self.pools
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(name.to_string()))
    }

    async fn get_chain_head(&self) -> Result<ChainHead, CollaboratorError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Network);
        }
        (*self.head.lock()).ok_or(CollaboratorError::Busy)
    }

    async fn get_mining_info(&self) -> Result<MiningInfo, CollaboratorError> {
        (*self.info.lock()).ok_or(CollaboratorError::Busy)
    }
}

#[derive(Default)]
pub struct MockWallet {
    pub outputs: Mutex<Vec<WalletOutput>>,
    pub built: Mutex<Vec<(CompositeTransfer, Vec<TransferLeg>)>>,
    pub committed: Mutex<Vec<TxId>>,
    pub submitted: Mutex<Vec<(StakeDetails, String)>>,
    pub next_tx: AtomicU64,
    pub fail_commit: AtomicBool,
    pub txs_per_build: Mutex<Option<usize>>,
}

#[async_trait]
impl Wallet for MockWallet {
    async fn list_unspent_outputs(&self) -> Result<Vec<WalletOutput>, CollaboratorError> {
        Ok(self.outputs.lock().clone())
    }

    fn is_unlocked(&self, _output: &WalletOutput) -> bool {
        true
    }

    fn address(&self, subaddress_account: u32) -> String {
        format!("wallet-{subaddress_account}")
    }

    async fn build_exchange_transactions(
        &self,
        _subaddress_account: u32,
        transfer: &CompositeTransfer,
        legs: &[TransferLeg],
        _fake_outs: usize,
    ) -> Result<Vec<PendingTransaction>, CollaboratorError> {
        self.built.lock().push((transfer.clone(), legs.to_vec()));
        let n = self.txs_per_build.lock().unwrap_or(1);
        Ok((0..n)
            .map(|_| {
                let id = self.next_tx.fetch_add(1, Ordering::SeqCst) + 1;
                let mut b = [0u8; 32];
                b[..8].copy_from_slice(&id.to_be_bytes());
                PendingTransaction {
                    txid: H256::from_bytes(b),
                    fee: 100,
                }
            })
            .collect())
    }

    async fn commit(&self, tx: &PendingTransaction) -> Result<(), CollaboratorError> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(CollaboratorError::Commit("rejected".to_string()));
        }
        self.committed.lock().push(tx.txid);
        Ok(())
    }

    async fn build_and_submit_pos_block(
        &self,
        details: &StakeDetails,
        reward_address: &str,
    ) -> Result<H256, CollaboratorError> {
        self.submitted
            .lock()
            .push((*details, reward_address.to_string()));
        Ok(details.pos_hash)
    }
}
