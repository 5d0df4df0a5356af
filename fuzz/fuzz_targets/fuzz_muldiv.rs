// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use amunchain_dex::core::math::{div128by128, U128};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (u128, u128, u128, bool)| {
    let (a, b, c, must_div) = input;
    let (a, b, c) = (U128::from(a), U128::from(b), U128::from(c));

    if let Ok((q, r)) = div128by128(a, c) {
        assert!(r < c);
        assert_eq!(q.try_mul(c).and_then(|p| p.try_add(r)), Ok(a));
    }

    if let Ok(q) = U128::muldiv(a, b, c, must_div) {
        // q * c <= a * b, checked where it fits natively
        if let (Ok(lhs), Ok(rhs)) = (q.try_mul(c), a.try_mul(b)) {
            assert!(lhs <= rhs);
            if must_div {
                assert_eq!(lhs, rhs);
            }
        }
    }
});
