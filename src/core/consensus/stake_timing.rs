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
#![deny(missing_docs)]

//! PoS block timing.
//!
//! A candidate may produce the next block once `weight * base_target * t`
//! exceeds its hash target, `t` being milliseconds since the previous block
//! and `weight` counted in whole coins (with atomic-unit precision). With a
//! uniform 64-bit hash target, one coin of weight at difficulty `d` waits up
//! to `d * TARGET_BLOCK_TIME_MS`, and `n` coins wait `1/n` of that.
//! The search below finds the last millisecond at which it may not.

use crate::core::economics::staking::{stake_weight, target, StakeCandidate};
use crate::core::math::U128;
use crate::core::types::{MiningInfo, StakeDetails, COIN};

/// Exclusive upper bound of the time search, in milliseconds.
pub const MAX_TIME_OFFSET_MS: u64 = 1 << 32;

/// Longest wait of one coin at difficulty 1, in milliseconds.
pub const TARGET_BLOCK_TIME_MS: u64 = 120_000;

/// Per-coin target slope for a network difficulty.
pub fn base_target(difficulty: u64) -> u64 {
    (u64::MAX / difficulty.max(1).saturating_mul(TARGET_BLOCK_TIME_MS)).max(1)
}

/// `weight * base_target * t / COIN`, saturating at `U128::MAX`.
pub fn target_function(t: u64, weight: u64, base_target: u64) -> U128 {
    let slope = U128::from(u128::from(weight) * u128::from(base_target));
    U128::muldiv(slope, U128::from(t), U128::from(COIN), false).unwrap_or(U128::MAX)
}

/// Largest `t` in `[0, MAX_TIME_OFFSET_MS)` with
/// `target_function(t, weight, base_target) <= hash_target`.
pub fn find_time_offset(weight: u64, base_target: u64, hash_target: u64) -> u64 {
    let limit = U128::from(hash_target);
    let (mut lo, mut hi) = (0u64, MAX_TIME_OFFSET_MS);
    // invariant: f(lo) <= limit, f(hi) > limit or hi is the exclusive bound
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if target_function(mid, weight, base_target) <= limit {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Stake details for `candidate` on top of the block described by `info`.
pub fn stake_details(candidate: &StakeCandidate, info: &MiningInfo, knee: u64) -> StakeDetails {
    let weight = stake_weight(candidate.output.amount, knee);
    let offset = find_time_offset(weight, base_target(info.difficulty), target(&candidate.pos_hash));
    StakeDetails {
        pos_hash: candidate.pos_hash,
        amount: candidate.output.amount,
        global_index: candidate.output.global_index,
        next_block_timestamp_ms: info.timestamp_ms.saturating_add(offset.max(1)),
        difficulty: info.difficulty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_the_last_time_below_target() {
        let (w, b, h) = (3 * COIN, 7, 1_000);
        let t = find_time_offset(w, b, h);
        assert!(target_function(t, w, b) <= U128::from(h));
        assert!(target_function(t + 1, w, b) > U128::from(h));
        assert_eq!(t, 47);
    }

    #[test]
    fn fractional_coins_keep_their_weight() {
        // half a coin at slope 10 climbs 5 per millisecond
        assert_eq!(target_function(4, COIN / 2, 10), U128::from(20u64));
        assert_eq!(find_time_offset(COIN / 2, 10, 21), 4);
    }

    #[test]
    fn zero_weight_never_qualifies() {
        assert_eq!(find_time_offset(0, 5, 5), MAX_TIME_OFFSET_MS - 1);
    }

    #[test]
    fn one_coin_waits_up_to_the_scaled_block_time() {
        let t = find_time_offset(COIN, base_target(1_000), u64::MAX);
        let expected = 1_000 * TARGET_BLOCK_TIME_MS;
        assert!(t.abs_diff(expected) <= 1, "{t}");
    }

    #[test]
    fn zero_difficulty_is_treated_as_one() {
        assert_eq!(base_target(0), base_target(1));
        assert_eq!(base_target(1), u64::MAX / TARGET_BLOCK_TIME_MS);
        assert_eq!(base_target(u64::MAX), 1);
    }
}
