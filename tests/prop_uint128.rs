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

use amunchain_dex::core::error::ErrorKind;
use amunchain_dex::core::math::{div128by128, MathError, U128};
use proptest::prelude::*;

fn u(v: u128) -> U128 {
    U128::from(v)
}

#[test]
fn decimal_round_trip_at_the_edges() {
    for v in [0u128, 1, u128::from(u64::MAX), u128::from(u64::MAX) + 1, u128::MAX] {
        let s = u(v).to_string();
        assert_eq!(s, v.to_string());
        assert_eq!(s.parse::<U128>().unwrap(), u(v));
    }
}

#[test]
fn malformed_decimals_are_rejected() {
    for s in ["", "12a", "-1", " 1", "1.0", "340282366920938463463374607431768211456"] {
        let e = s.parse::<U128>().unwrap_err();
        assert_eq!(e, MathError::Parse);
        assert_eq!(e.kind(), ErrorKind::ParseError);
    }
}

#[test]
fn overflow_is_reported_not_wrapped() {
    let e = U128::MAX.try_add(U128::ONE).unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ArithmeticOverflow);
    assert_eq!(U128::ZERO.try_sub(U128::ONE), Err(MathError::Overflow));
    assert_eq!(u(1 << 64).try_mul(u(1 << 64)), Err(MathError::Overflow));
    assert_eq!(U128::ONE.try_div(U128::ZERO), Err(MathError::DivisionByZero));
}

#[test]
fn shifts_wrap_the_count() {
    assert_eq!(U128::ONE << 130, u(4));
    assert_eq!(u(1 << 127) >> 127, U128::ONE);
    assert_eq!(u(8) >> 129, u(4));
}

#[test]
fn muldiv_reports_each_failure() {
    assert_eq!(U128::muldiv(u(7), u(3), U128::ZERO, false), Err(MathError::DivisionByZero));
    assert_eq!(U128::muldiv(u(7), u(3), u(2), true), Err(MathError::DivisionNotExact));
    assert_eq!(U128::muldiv(u(7), u(3), u(2), false), Ok(u(10)));
    assert_eq!(U128::muldiv(U128::MAX, U128::MAX, U128::ONE, false), Err(MathError::Overflow));
    assert_eq!(U128::muldiv(U128::MAX, u(4), u(8), false), Ok(U128::MAX >> 1));
}

#[test]
fn isqrt_edges() {
    assert_eq!(U128::ZERO.isqrt(), 0);
    assert_eq!(u(15).isqrt(), 3);
    assert_eq!(u(16).isqrt(), 4);
    assert_eq!(U128::MAX.isqrt(), u64::MAX);
}

proptest! {
    #[test]
    fn decimal_round_trip(v in any::<u128>()) {
        let s = u(v).to_string();
        prop_assert_eq!(&s, &v.to_string());
        prop_assert_eq!(s.parse::<U128>().unwrap(), u(v));
    }

    #[test]
    fn add_sub_match_native(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(u(a).try_add(u(b)).ok(), a.checked_add(b).map(u));
        prop_assert_eq!(u(a).try_sub(u(b)).ok(), a.checked_sub(b).map(u));
        if let Some(s) = a.checked_add(b) {
            prop_assert_eq!(u(s).try_sub(u(b)).unwrap(), u(a));
        }
    }

    #[test]
    fn mul_matches_native(a in any::<u128>(), b in any::<u64>()) {
        prop_assert_eq!(u(a).try_mul(u(b.into())).ok(), a.checked_mul(b.into()).map(u));
    }

    #[test]
    fn ordering_matches_native(a in any::<u128>(), b in any::<u128>()) {
        prop_assert_eq!(u(a).cmp(&u(b)), a.cmp(&b));
    }

    #[test]
    fn div128by128_reconstructs(num in any::<u128>(), den in 1..=u128::MAX) {
        let (q, r) = div128by128(u(num), u(den)).unwrap();
        prop_assert!(r < u(den));
        prop_assert_eq!(q.try_mul(u(den)).unwrap().try_add(r).unwrap(), u(num));
        prop_assert_eq!(u128::from(q), num / den);
    }

    #[test]
    fn div128by128_narrow_divisor(num in any::<u128>(), den in 1..=u64::MAX) {
        let (q, r) = div128by128(u(num), u(den.into())).unwrap();
        prop_assert_eq!(u128::from(q), num / u128::from(den));
        prop_assert_eq!(u128::from(r), num % u128::from(den));
    }

    #[test]
    fn muldiv_cancels_narrow_factor(a in any::<u128>(), b in 1..=u64::MAX) {
        prop_assert_eq!(U128::muldiv(u(a), u(b.into()), u(b.into()), true).unwrap(), u(a));
    }

    #[test]
    fn muldiv_matches_native_on_small_operands(a in any::<u64>(), b in any::<u64>(), c in 1..=u64::MAX) {
        let expect = u128::from(a) * u128::from(b) / u128::from(c);
        prop_assert_eq!(
            U128::muldiv(u(a.into()), u(b.into()), u(c.into()), false).unwrap(),
            u(expect)
        );
    }

    #[test]
    fn isqrt_is_floor(v in any::<u128>()) {
        let r = u128::from(u(v).isqrt());
        prop_assert!(r * r <= v);
        prop_assert!((r + 1).checked_mul(r + 1).map_or(true, |s| s > v));
    }
}
