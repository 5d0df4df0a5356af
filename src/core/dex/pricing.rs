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

//! Constant-product pricing: LP minting/burning and buy/sell quotes.
//!
//! Every function here is pure. Intermediate products go through [`U128`] so
//! that `amount * reserve` never overflows; results that do not fit back into
//! 64 bits are reported, never clamped. Quotes round down.

use crate::core::error::ErrorKind;
use crate::core::math::U128;
use crate::core::types::{AmountRatio, ExchangeTransfer, LiquidityPool, TokenId, INTEREST_DENOMINATOR};
use thiserror::Error;

/// Pricing errors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// `amount * reserve / reserve'` does not fit 64 bits.
    #[error("ratio overflow")]
    RatioOverflow,
    /// Adding or taking the pool interest does not fit 64 bits.
    #[error("interest overflow")]
    InterestOverflow,
    /// The exchange would take every unit of a reserve.
    #[error("cannot drain all pool liquidity")]
    DrainingDisallowed,
    /// Zero reserves, zero deposits or an LP amount the pool cannot honour.
    #[error("invalid liquidity")]
    InvalidLiquidity,
    /// The LP token amount does not fit 64 bits.
    #[error("lp token overflow")]
    LpOverflow,
    /// Pool interest above 1000 parts per thousand.
    #[error("invalid pool interest")]
    InvalidInterest,
    /// A pool cannot pair a token with itself.
    #[error("identical pool tokens")]
    IdenticalTokens,
    /// Transfer belongs to another pool.
    #[error("transfer does not match pool")]
    PoolMismatch,
    /// Transfer was planned against reserves that have since changed.
    #[error("stale pool state")]
    StaleState,
}

impl PoolError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PoolError::RatioOverflow | PoolError::InterestOverflow | PoolError::LpOverflow => {
                ErrorKind::ArithmeticOverflow
            }
            PoolError::StaleState => ErrorKind::StateError,
            _ => ErrorKind::DomainError,
        }
    }
}

/// Both initial deposits must be strictly positive.
pub fn check_initial_pool_liquidity(amount1: u64, amount2: u64) -> Result<(), PoolError> {
    if amount1 == 0 || amount2 == 0 {
        return Err(PoolError::InvalidLiquidity);
    }
    Ok(())
}

/// LP tokens a reserve pair is worth: `floor(sqrt(amount1 * amount2))`.
pub fn lp_tokens_for_ratio(ratio: AmountRatio) -> u64 {
    U128::from(u128::from(ratio.amount1) * u128::from(ratio.amount2)).isqrt()
}

/// `floor(amount * reserve / denominator)` narrowed to 64 bits.
fn ratio_quote(amount: u64, reserve: u64, denominator: U128) -> Result<u64, PoolError> {
    U128::muldiv(U128::from(amount), U128::from(reserve), denominator, false)
        .ok()
        .and_then(U128::to_u64)
        .ok_or(PoolError::RatioOverflow)
}

/// `floor(amount * interest / 1000)`.
fn interest_on(amount: u64, interest: u32) -> Result<u64, PoolError> {
    if u64::from(interest) > INTEREST_DENOMINATOR {
        return Err(PoolError::InvalidInterest);
    }
    U128::muldiv(
        U128::from(amount),
        U128::from(u64::from(interest)),
        U128::from(INTEREST_DENOMINATOR),
        false,
    )
    .ok()
    .and_then(U128::to_u64)
    .ok_or(PoolError::InterestOverflow)
}

/// Token2 the caller pays to take `amount1` of token1 out of the pool,
/// interest included: `q + q*i/1000` with `q = amount1 * B / (A - amount1)`.
pub fn buy_amount(ratio: AmountRatio, amount1: u64, interest: u32) -> Result<u64, PoolError> {
    if amount1 >= ratio.amount1 {
        return Err(PoolError::DrainingDisallowed);
    }
    let q = ratio_quote(amount1, ratio.amount2, U128::from(ratio.amount1 - amount1))?;
    let fee = interest_on(q, interest)?;
    q.checked_add(fee).ok_or(PoolError::InterestOverflow)
}

/// Token2 the caller receives for putting `amount1` of token1 into the pool,
/// interest deducted: `q - q*i/1000` with `q = amount1 * B / (A + amount1)`.
pub fn sell_amount(ratio: AmountRatio, amount1: u64, interest: u32) -> Result<u64, PoolError> {
    let denominator = U128::from(ratio.amount1)
        .try_add(U128::from(amount1))
        .map_err(|_| PoolError::RatioOverflow)?;
    if denominator.is_zero() {
        return Err(PoolError::InvalidLiquidity);
    }
    let q = ratio_quote(amount1, ratio.amount2, denominator)?;
    let fee = interest_on(q, interest)?;
    q.checked_sub(fee).ok_or(PoolError::InterestOverflow)
}

/// Token1 that must be supplied to take `amount2` of token2 out of the pool.
///
/// The interest is taken from reserve B before dividing: with
/// `B' = B - B*i/1000` the result is `amount2 * A / (B' - amount2)`, and
/// `amount2 >= B'` is rejected as draining.
pub fn inverse_buy_amount(ratio: AmountRatio, amount2: u64, interest: u32) -> Result<u64, PoolError> {
    let effective = ratio.amount2 - interest_on(ratio.amount2, interest)?;
    if amount2 >= effective {
        return Err(PoolError::DrainingDisallowed);
    }
    ratio_quote(amount2, ratio.amount1, U128::from(effective - amount2))
}

/// Percent by which `proposed`'s rate deviates from the pool rate.
///
/// Floating point on purpose: this is a UI number, not a consensus value.
pub fn price_impact(pool: AmountRatio, proposed: AmountRatio) -> f64 {
    (proposed.rate() / pool.rate() - 1.0) * 100.0
}

/// LP supply after the reserves move from `old` to `new`:
/// `lp * sqrt(new_A*new_B) / sqrt(old_A*old_B)`.
fn rescaled_lp(old: AmountRatio, new: AmountRatio, lp_supply: u64) -> Result<u64, PoolError> {
    let old_root = lp_tokens_for_ratio(old);
    let new_root = lp_tokens_for_ratio(new);
    if old_root == 0 || lp_supply == 0 {
        return Ok(new_root);
    }
    U128::muldiv(
        U128::from(lp_supply),
        U128::from(new_root),
        U128::from(old_root),
        false,
    )
    .ok()
    .and_then(U128::to_u64)
    .ok_or(PoolError::LpOverflow)
}

/// LP tokens to mint when reserves grow from `old` to `new`.
pub fn lp_increment(old: AmountRatio, new: AmountRatio, lp_supply: u64) -> Result<u64, PoolError> {
    rescaled_lp(old, new, lp_supply)?
        .checked_sub(lp_supply)
        .ok_or(PoolError::InvalidLiquidity)
}

/// LP tokens to burn when reserves shrink from `old` to `new`.
pub fn lp_decrement(old: AmountRatio, new: AmountRatio, lp_supply: u64) -> Result<u64, PoolError> {
    lp_supply
        .checked_sub(rescaled_lp(old, new, lp_supply)?)
        .ok_or(PoolError::InvalidLiquidity)
}

impl LiquidityPool {
    /// Genesis of a pool; returns the pool and the LP tokens minted.
    pub fn create(
        lp_token: TokenId,
        token1: TokenId,
        token2: TokenId,
        amount1: u64,
        amount2: u64,
    ) -> Result<(Self, u64), PoolError> {
        if token1 == token2 {
            return Err(PoolError::IdenticalTokens);
        }
        check_initial_pool_liquidity(amount1, amount2)?;
        let ratio = AmountRatio::new(amount1, amount2);
        let minted = lp_tokens_for_ratio(ratio);
        let pool = Self {
            lp_token,
            token1,
            token2,
            lp_supply: minted,
            ratio,
        };
        Ok((pool, minted))
    }

    /// Deposit both tokens; returns the new pool and the LP tokens minted.
    pub fn add_liquidity(&self, amount1: u64, amount2: u64) -> Result<(Self, u64), PoolError> {
        if amount1 == 0 || amount2 == 0 {
            return Err(PoolError::InvalidLiquidity);
        }
        let ratio = AmountRatio::new(
            self.ratio.amount1.checked_add(amount1).ok_or(PoolError::RatioOverflow)?,
            self.ratio.amount2.checked_add(amount2).ok_or(PoolError::RatioOverflow)?,
        );
        let minted = lp_increment(self.ratio, ratio, self.lp_supply)?;
        let lp_supply = self.lp_supply.checked_add(minted).ok_or(PoolError::LpOverflow)?;
        Ok((
            Self {
                lp_supply,
                ratio,
                ..self.clone()
            },
            minted,
        ))
    }

    /// Burn `lp_amount`; returns the new pool and the reserves paid out.
    pub fn take_liquidity(&self, lp_amount: u64) -> Result<(Self, AmountRatio), PoolError> {
        if lp_amount == 0 || lp_amount > self.lp_supply {
            return Err(PoolError::InvalidLiquidity);
        }
        let share = |reserve: u64| {
            U128::muldiv(
                U128::from(reserve),
                U128::from(lp_amount),
                U128::from(self.lp_supply),
                false,
            )
            .ok()
            .and_then(U128::to_u64)
            .ok_or(PoolError::LpOverflow)
        };
        let paid = AmountRatio::new(share(self.ratio.amount1)?, share(self.ratio.amount2)?);
        let ratio = AmountRatio::new(
            self.ratio.amount1 - paid.amount1,
            self.ratio.amount2 - paid.amount2,
        );
        Ok((
            Self {
                lp_supply: self.lp_supply - lp_amount,
                ratio,
                ..self.clone()
            },
            paid,
        ))
    }

    /// Apply a planned transfer, refusing if reserves moved since planning.
    pub fn apply_transfer(&self, transfer: &ExchangeTransfer) -> Result<Self, PoolError> {
        if transfer.token1 != self.token1 || transfer.token2 != self.token2 {
            return Err(PoolError::PoolMismatch);
        }
        if transfer.before != self.ratio {
            return Err(PoolError::StaleState);
        }
        Ok(Self {
            ratio: transfer.after,
            ..self.clone()
        })
    }
}

impl ExchangeTransfer {
    /// Absolute amounts of each token that moved.
    pub fn traded(&self) -> AmountRatio {
        AmountRatio::new(
            self.before.amount1.abs_diff(self.after.amount1),
            self.before.amount2.abs_diff(self.after.amount2),
        )
    }

    /// Price impact of this transfer against the pre-trade pool rate.
    pub fn price_impact(&self) -> f64 {
        price_impact(self.before, self.traded())
    }
}
