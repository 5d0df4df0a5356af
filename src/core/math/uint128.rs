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

//! Overflow-checked 128-bit unsigned integer built from two 64-bit limbs.
//!
//! Every operation that can leave the `[0, 2^128)` range returns
//! [`MathError::Overflow`] instead of wrapping. Division is a normalized long
//! division on 64-bit limbs; the only primitives are a 64x64->128 multiply and a
//! 128/64 divide whose quotient is known to fit one limb.

use crate::core::error::ErrorKind;
use std::fmt;
use std::ops::{Shl, Shr};
use std::str::FromStr;
use thiserror::Error;

/// Arithmetic errors.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MathError {
    /// Result does not fit the target width.
    #[error("arithmetic overflow")]
    Overflow,
    /// Divisor is zero.
    #[error("division by zero")]
    DivisionByZero,
    /// Exact division requested but the remainder is non-zero.
    #[error("division not exact")]
    DivisionNotExact,
    /// Malformed decimal string.
    #[error("malformed decimal string")]
    Parse,
}

impl MathError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MathError::Overflow => ErrorKind::ArithmeticOverflow,
            MathError::DivisionByZero => ErrorKind::DomainError,
            MathError::DivisionNotExact => ErrorKind::DivisionNotExact,
            MathError::Parse => ErrorKind::ParseError,
        }
    }
}

/// Unsigned 128-bit integer.
///
/// Field order matters: the derived `Ord` compares `hi` first, then `lo`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U128 {
    hi: u64,
    lo: u64,
}

// 10^19 is the largest power of ten that fits one limb.
const DECIMAL_CHUNK: u64 = 10_000_000_000_000_000_000;
const DECIMAL_CHUNK_DIGITS: usize = 19;

/// 64x64 -> 128 multiply, returned as `(lo, hi)`.
#[inline]
fn long_mul(a: u64, b: u64) -> (u64, u64) {
    let p = u128::from(a) * u128::from(b);
    (p as u64, (p >> 64) as u64)
}

/// 128/64 divide returning `(quotient, remainder)`. Requires `hi < d`.
#[inline]
fn long_div(hi: u64, lo: u64, d: u64) -> (u64, u64) {
    debug_assert!(hi < d);
    let n = (u128::from(hi) << 64) | u128::from(lo);
    let d = u128::from(d);
    ((n / d) as u64, (n % d) as u64)
}

impl U128 {
    /// Zero.
    pub const ZERO: Self = Self { hi: 0, lo: 0 };
    /// One.
    pub const ONE: Self = Self { hi: 0, lo: 1 };
    /// 2^128 - 1.
    pub const MAX: Self = Self {
        hi: u64::MAX,
        lo: u64::MAX,
    };

    /// Build from the high and low limbs.
    pub const fn from_parts(hi: u64, lo: u64) -> Self {
        Self { hi, lo }
    }

    /// High limb.
    pub const fn hi(self) -> u64 {
        self.hi
    }

    /// Low limb.
    pub const fn lo(self) -> u64 {
        self.lo
    }

    /// True for zero.
    pub const fn is_zero(self) -> bool {
        self.hi == 0 && self.lo == 0
    }

    /// Narrow to 64 bits if the value fits.
    pub const fn to_u64(self) -> Option<u64> {
        if self.hi == 0 {
            Some(self.lo)
        } else {
            None
        }
    }

    /// Number of leading zero bits.
    pub const fn leading_zeros(self) -> u32 {
        if self.hi == 0 {
            64 + self.lo.leading_zeros()
        } else {
            self.hi.leading_zeros()
        }
    }

    /// Checked addition.
    pub fn try_add(self, rhs: Self) -> Result<Self, MathError> {
        let (lo, carry) = self.lo.overflowing_add(rhs.lo);
        let hi = self
            .hi
            .checked_add(rhs.hi)
            .and_then(|h| h.checked_add(u64::from(carry)))
            .ok_or(MathError::Overflow)?;
        Ok(Self { hi, lo })
    }

    /// Checked subtraction.
    pub fn try_sub(self, rhs: Self) -> Result<Self, MathError> {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let hi = self
            .hi
            .checked_sub(rhs.hi)
            .and_then(|h| h.checked_sub(u64::from(borrow)))
            .ok_or(MathError::Overflow)?;
        Ok(Self { hi, lo })
    }

    /// Checked multiplication.
    pub fn try_mul(self, rhs: Self) -> Result<Self, MathError> {
        if self.hi != 0 && rhs.hi != 0 {
            return Err(MathError::Overflow);
        }
        let (lo, carry) = long_mul(self.lo, rhs.lo);
        let (cross_a, cross_a_hi) = long_mul(self.hi, rhs.lo);
        let (cross_b, cross_b_hi) = long_mul(self.lo, rhs.hi);
        if cross_a_hi != 0 || cross_b_hi != 0 {
            return Err(MathError::Overflow);
        }
        let hi = carry
            .checked_add(cross_a)
            .and_then(|h| h.checked_add(cross_b))
            .ok_or(MathError::Overflow)?;
        Ok(Self { hi, lo })
    }

    /// Checked division (truncating).
    pub fn try_div(self, rhs: Self) -> Result<Self, MathError> {
        div128by128(self, rhs).map(|(q, _)| q)
    }

    /// Checked remainder.
    pub fn try_rem(self, rhs: Self) -> Result<Self, MathError> {
        div128by128(self, rhs).map(|(_, r)| r)
    }

    /// Divide by a single limb, returning quotient and remainder.
    pub fn div_rem_u64(self, d: u64) -> Result<(Self, u64), MathError> {
        if d == 0 {
            return Err(MathError::DivisionByZero);
        }
        let q_hi = self.hi / d;
        let (q_lo, r) = long_div(self.hi % d, self.lo, d);
        Ok((Self { hi: q_hi, lo: q_lo }, r))
    }

    /// `floor(a * b / c)` through a 256-bit product.
    ///
    /// Fails with `Overflow` when the product needs more than 192 bits or the
    /// quotient more than 128, and with `DivisionNotExact` when `must_div` is set
    /// and the remainder is non-zero.
    pub fn muldiv(a: Self, b: Self, c: Self, must_div: bool) -> Result<Self, MathError> {
        if c.is_zero() {
            return Err(MathError::DivisionByZero);
        }
        let [p0, p1, p2, p3] = mul_wide(a, b);
        if p3 != 0 {
            return Err(MathError::Overflow);
        }
        let (q, r) = div_wide(p2, p1, p0, c)?;
        if must_div && !r.is_zero() {
            return Err(MathError::DivisionNotExact);
        }
        Ok(q)
    }

    /// Integer square root, `floor(sqrt(self))`.
    pub fn isqrt(self) -> u64 {
        let n = u128::from(self);
        if n < 2 {
            return n as u64;
        }
        // Start above the root and walk down with Newton steps.
        let mut x = 1u128 << ((128 - n.leading_zeros() + 1) / 2);
        loop {
            let y = (x + n / x) >> 1;
            if y >= x {
                return x as u64;
            }
            x = y;
        }
    }

    fn wrapping_sub(self, rhs: Self) -> Self {
        let (lo, borrow) = self.lo.overflowing_sub(rhs.lo);
        let hi = self.hi.wrapping_sub(rhs.hi).wrapping_sub(u64::from(borrow));
        Self { hi, lo }
    }
}

/// Long division `num / den`, returning `(quotient, remainder)`.
///
/// For a divisor wider than one limb both operands are normalized by the
/// divisor's leading-zero count, a 128/64 trial division on the top limbs gives
/// an estimate that may be one too large, and a single decrement/increment pass
/// against the unshifted divisor corrects it.
pub fn div128by128(num: U128, den: U128) -> Result<(U128, U128), MathError> {
    if den.is_zero() {
        return Err(MathError::DivisionByZero);
    }
    if den.hi == 0 {
        let (q, r) = num.div_rem_u64(den.lo)?;
        return Ok((q, U128::from(r)));
    }

    let shift = den.hi.leading_zeros();
    let v1 = (den << shift).hi;
    // Halve the dividend so the trial quotient fits one limb.
    let u1 = num >> 1;
    let (q1, _) = long_div(u1.hi, u1.lo, v1);

    let mut q0 = ((U128::from(q1) << shift) >> 63).lo;
    if q0 != 0 {
        q0 -= 1;
    }
    // q0 never exceeds the true quotient here, so the product fits.
    let mut rem = num.try_sub(den.try_mul(U128::from(q0))?)?;
    if rem >= den {
        q0 += 1;
        rem = rem.try_sub(den)?;
    }
    Ok((U128::from(q0), rem))
}

/// Full 128x128 product as four little-endian limbs.
fn mul_wide(a: U128, b: U128) -> [u64; 4] {
    let (p00, p00_hi) = long_mul(a.lo, b.lo);
    let (p01, p01_hi) = long_mul(a.lo, b.hi);
    let (p10, p10_hi) = long_mul(a.hi, b.lo);
    let (p11, p11_hi) = long_mul(a.hi, b.hi);

    let mid = u128::from(p00_hi) + u128::from(p01) + u128::from(p10);
    let upper = u128::from(p01_hi) + u128::from(p10_hi) + u128::from(p11) + (mid >> 64);
    let top = p11_hi + (upper >> 64) as u64;
    [p00, mid as u64, upper as u64, top]
}

/// Divide the 192-bit value `(l2, l1, l0)` by `c`.
fn div_wide(l2: u64, l1: u64, l0: u64, c: U128) -> Result<(U128, U128), MathError> {
    if c.hi == 0 {
        let d = c.lo;
        if l2 >= d {
            return Err(MathError::Overflow);
        }
        let (q1, r1) = long_div(l2, l1, d);
        let (q0, r0) = long_div(r1, l0, d);
        return Ok((U128::from_parts(q1, q0), U128::from(r0)));
    }

    // c >= 2^64 and the dividend is below 2^192, so the quotient fits 128 bits.
    let mut rem = U128::ZERO;
    let mut q = U128::ZERO;
    for limb in [l2, l1, l0] {
        for bit in (0..64).rev() {
            let carry_out = rem.hi >> 63;
            rem = U128 {
                hi: (rem.hi << 1) | (rem.lo >> 63),
                lo: (rem.lo << 1) | ((limb >> bit) & 1),
            };
            q = q << 1;
            if carry_out == 1 || rem >= c {
                rem = rem.wrapping_sub(c);
                q.lo |= 1;
            }
        }
    }
    Ok((q, rem))
}

impl Shl<u32> for U128 {
    type Output = U128;

    /// Shift left by `n mod 128`.
    fn shl(self, n: u32) -> U128 {
        let n = n % 128;
        match n {
            0 => self,
            1..=63 => U128 {
                hi: (self.hi << n) | (self.lo >> (64 - n)),
                lo: self.lo << n,
            },
            _ => U128 {
                hi: self.lo << (n - 64),
                lo: 0,
            },
        }
    }
}

impl Shr<u32> for U128 {
    type Output = U128;

    /// Shift right by `n mod 128`.
    fn shr(self, n: u32) -> U128 {
        let n = n % 128;
        match n {
            0 => self,
            1..=63 => U128 {
                hi: self.hi >> n,
                lo: (self.lo >> n) | (self.hi << (64 - n)),
            },
            _ => U128 {
                hi: 0,
                lo: self.hi >> (n - 64),
            },
        }
    }
}

impl From<u64> for U128 {
    fn from(v: u64) -> Self {
        Self { hi: 0, lo: v }
    }
}

impl From<u128> for U128 {
    fn from(v: u128) -> Self {
        Self {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

impl From<U128> for u128 {
    fn from(v: U128) -> Self {
        (u128::from(v.hi) << 64) | u128::from(v.lo)
    }
}

impl TryFrom<U128> for u64 {
    type Error = MathError;

    fn try_from(v: U128) -> Result<Self, Self::Error> {
        v.to_u64().ok_or(MathError::Overflow)
    }
}

impl fmt::Display for U128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut chunks: Vec<u64> = Vec::with_capacity(3);
        let mut v = *self;
        loop {
            let (q, r) = v.div_rem_u64(DECIMAL_CHUNK).map_err(|_| fmt::Error)?;
            chunks.push(r);
            if q.is_zero() {
                break;
            }
            v = q;
        }
        let mut it = chunks.iter().rev();
        if let Some(first) = it.next() {
            write!(f, "{first}")?;
        }
        for c in it {
            write!(f, "{c:0width$}", width = DECIMAL_CHUNK_DIGITS)?;
        }
        Ok(())
    }
}

impl FromStr for U128 {
    type Err = MathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(MathError::Parse);
        }
        let ten = U128::from(10u64);
        let mut v = U128::ZERO;
        for b in s.bytes() {
            if !b.is_ascii_digit() {
                return Err(MathError::Parse);
            }
            v = v
                .try_mul(ten)
                .and_then(|x| x.try_add(U128::from(u64::from(b - b'0'))))
                .map_err(|_| MathError::Parse)?;
        }
        Ok(v)
    }
}
