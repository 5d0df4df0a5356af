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

//! Stake eligibility and candidate ranking.

use crate::core::interfaces::FastHash;
use crate::core::math::{atan2c, ATAN_SCALE, U128};
use crate::core::types::{TokenId, WalletOutput, H256};
use std::cmp::Ordering;

/// Which outputs may stake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StakePolicy {
    /// The native coin; only it stakes.
    pub native: TokenId,
    /// Smallest stakeable amount.
    pub min_amount: u64,
    /// Blocks an output must be buried under.
    pub maturity_blocks: u64,
}

impl StakePolicy {
    /// True if `output` may stake at `height`.
    pub fn is_eligible(&self, output: &WalletOutput, unlocked: bool, height: u64) -> bool {
        output.token == self.native
            && output.amount >= self.min_amount
            && unlocked
            && output
                .block_height
                .checked_add(self.maturity_blocks)
                .is_some_and(|mature_at| mature_at <= height)
    }
}

/// An eligible output and its PoS hash for the next block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StakeCandidate {
    /// The output.
    pub output: WalletOutput,
    /// `fast_hash(key_image || previous pos hash)`.
    pub pos_hash: H256,
}

/// PoS hash of an output for the block after `prev_pos_hash`.
pub fn pos_hash<H: FastHash + ?Sized>(hasher: &H, key_image: &[u8; 32], prev_pos_hash: &H256) -> H256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(key_image);
    buf[32..].copy_from_slice(prev_pos_hash.as_bytes());
    hasher.fast_hash(&buf)
}

/// Numeric target of a hash: its first eight bytes, little endian.
pub fn target(hash: &H256) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(b)
}

/// Orders candidates by `target / amount`, smallest first, without division:
/// `a < b` iff `amount_b * target(a) < amount_a * target(b)`.
pub fn compare_candidates(a: &StakeCandidate, b: &StakeCandidate) -> Ordering {
    let lhs = U128::from(u128::from(b.output.amount) * u128::from(target(&a.pos_hash)));
    let rhs = U128::from(u128::from(a.output.amount) * u128::from(target(&b.pos_hash)));
    lhs.cmp(&rhs)
}

/// Hash every eligible output and return the best one.
pub fn select_candidate<H, F>(
    outputs: &[WalletOutput],
    policy: &StakePolicy,
    hasher: &H,
    is_unlocked: F,
    height: u64,
    prev_pos_hash: &H256,
) -> Option<StakeCandidate>
where
    H: FastHash + ?Sized,
    F: Fn(&WalletOutput) -> bool,
{
    outputs
        .iter()
        .filter(|o| policy.is_eligible(o, is_unlocked(o), height))
        .map(|o| StakeCandidate {
            output: o.clone(),
            pos_hash: pos_hash(hasher, &o.key_image, prev_pos_hash),
        })
        .min_by(compare_candidates)
}

/// Effective stake: `amount * (1 - atan(amount / knee) / 2pi)`.
///
/// Equals the amount for small stakes and flattens to three quarters of it
/// well past the knee.
pub fn stake_weight(amount: u64, knee: u64) -> u64 {
    if amount == 0 {
        return 0;
    }
    let angle = atan2c(i128::from(amount), i128::from(knee.max(1))).clamp(0, ATAN_SCALE / 2);
    // angle <= ATAN_SCALE / 2, so the cut never exceeds a quarter of amount
    let cut = u128::from(amount) * angle as u128 / (2 * ATAN_SCALE) as u128;
    amount - cut as u64
}
