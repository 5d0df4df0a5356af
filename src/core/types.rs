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

//! Core value types shared by the pricing engine, the planner, the exchanger
//! and the PoS controller.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Atomic units in one coin.
pub const COIN: u64 = 1_000_000_000_000;

/// Denominator of the pool interest (parts per thousand).
pub const INTEREST_DENOMINATOR: u64 = 1_000;

/// 256-bit hash type (32 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct H256([u8; 32]);

impl H256 {
    /// Construct from raw bytes.
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }
    /// Return bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Transaction id.
pub type TxId = H256;

/// Token identifier as assigned by the token registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reserves of a pool at one point in time: `amount1` of token1 and
/// `amount2` of token2 (the underlying/quote token).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AmountRatio {
    /// Reserve of token1.
    pub amount1: u64,
    /// Reserve of token2.
    pub amount2: u64,
}

impl AmountRatio {
    /// Build a ratio.
    pub const fn new(amount1: u64, amount2: u64) -> Self {
        Self { amount1, amount2 }
    }

    /// Same reserves seen from the other token.
    pub const fn inverted(self) -> Self {
        Self {
            amount1: self.amount2,
            amount2: self.amount1,
        }
    }

    /// `amount1 / amount2` as a float; display only.
    pub fn rate(self) -> f64 {
        self.amount1 as f64 / self.amount2 as f64
    }
}

impl fmt::Display for AmountRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.amount1, self.amount2)
    }
}

/// A constant-product liquidity pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LiquidityPool {
    /// LP token, unique per unordered (token1, token2) pair.
    pub lp_token: TokenId,
    /// First token in direct order.
    pub token1: TokenId,
    /// Second token in direct order (the native coin when present).
    pub token2: TokenId,
    /// Outstanding LP tokens.
    pub lp_supply: u64,
    /// Current reserves.
    pub ratio: AmountRatio,
}

impl LiquidityPool {
    /// True if `token` is one of the two pool tokens.
    pub fn contains(&self, token: TokenId) -> bool {
        self.token1 == token || self.token2 == token
    }

    /// The pool token that is not `token`.
    pub fn other(&self, token: TokenId) -> Option<TokenId> {
        if token == self.token1 {
            Some(self.token2)
        } else if token == self.token2 {
            Some(self.token1)
        } else {
            None
        }
    }

    /// Reserves oriented so that `amount1` is the reserve of `token`.
    pub fn oriented(&self, token: TokenId) -> Option<AmountRatio> {
        if token == self.token1 {
            Some(self.ratio)
        } else if token == self.token2 {
            Some(self.ratio.inverted())
        } else {
            None
        }
    }

    /// Reserve held for `token`.
    pub fn reserve_of(&self, token: TokenId) -> Option<u64> {
        self.oriented(token).map(|r| r.amount1)
    }
}

/// Direction of an exchange from the caller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// `amount` is what the caller receives of the destination token.
    Buy,
    /// `amount` is what the caller gives of the source token.
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        })
    }
}

/// One pool's state transition caused by a single exchange, in the pool's
/// native token orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExchangeTransfer {
    /// Token whose reserve is `amount1`.
    pub token1: TokenId,
    /// Token whose reserve is `amount2`.
    pub token2: TokenId,
    /// Reserves before the exchange.
    pub before: AmountRatio,
    /// Reserves after the exchange.
    pub after: AmountRatio,
}

/// What the caller asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositeTransferRequest {
    /// Token the caller pays with.
    pub source: TokenId,
    /// Token the caller receives.
    pub destination: TokenId,
    /// Amount; meaning depends on `side`.
    pub amount: u64,
    /// Pool interest in parts per thousand.
    pub pool_interest: u32,
    /// Buy or sell.
    pub side: Side,
}

/// A planned exchange across one or more pools.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeTransfer {
    /// Originating request.
    pub request: CompositeTransferRequest,
    /// Per-hop transitions in path order (source side first).
    pub transfers: Vec<ExchangeTransfer>,
    /// Net effect between the two endpoint tokens:
    /// `token1 == source`, `token2 == destination`.
    pub summary: ExchangeTransfer,
    /// Amount of the source token paid.
    pub amount_in: u64,
    /// Amount of the destination token received.
    pub amount_out: u64,
}

/// Where the funds of one leg of an exchange transaction come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Origin {
    /// The user's wallet.
    Wallet,
    /// The shared LP account holding pool reserves.
    LpAccount,
}

/// One movement of funds inside an exchange transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferLeg {
    /// Funding side.
    pub origin: Origin,
    /// Token moved.
    pub token: TokenId,
    /// Amount moved.
    pub amount: u64,
    /// Receiving address.
    pub destination_address: String,
}

/// Network flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Production network.
    Mainnet,
    /// Public test network.
    Testnet,
    /// Staging network.
    Stagenet,
}

/// Well-known addresses of one network, built once at start-up and passed to
/// whoever needs them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkAddresses {
    /// Network these addresses belong to.
    pub network: NetworkType,
    /// Address of the LP account that holds every pool's reserves.
    pub lp_account_address: String,
}

impl NetworkAddresses {
    /// Address that funds or receives a leg of the given origin.
    pub fn address_for(&self, origin: Origin, wallet_address: &str) -> String {
        match origin {
            Origin::Wallet => wallet_address.to_string(),
            Origin::LpAccount => self.lp_account_address.clone(),
        }
    }
}

/// Current chain head.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainHead {
    /// Height of the top block.
    pub height: u64,
    /// Hash of the top block.
    pub hash: H256,
}

/// Mining parameters published by the daemon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningInfo {
    /// Height of the top block.
    pub height: u64,
    /// PoS hash of the top block.
    pub pos_hash: H256,
    /// Current network difficulty.
    pub difficulty: u64,
    /// Timestamp of the top block in milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
}

/// An unspent wallet output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletOutput {
    /// Key image of the output.
    pub key_image: [u8; 32],
    /// Amount in atomic units.
    pub amount: u64,
    /// Token of the output.
    pub token: TokenId,
    /// Global output index.
    pub global_index: u64,
    /// Height of the block that created the output.
    pub block_height: u64,
}

/// A staking candidate and its computed next-block time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakeDetails {
    /// `fast_hash(key_image || previous pos hash)`.
    pub pos_hash: H256,
    /// Staked amount.
    pub amount: u64,
    /// Global index of the staked output.
    pub global_index: u64,
    /// Earliest timestamp (ms) at which this candidate may produce a block.
    pub next_block_timestamp_ms: u64,
    /// Difficulty the timestamp was computed against.
    pub difficulty: u64,
}

/// A signed transaction that has not been relayed yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTransaction {
    /// Transaction id.
    pub txid: TxId,
    /// Fee paid, atomic units of the native coin.
    pub fee: u64,
}
