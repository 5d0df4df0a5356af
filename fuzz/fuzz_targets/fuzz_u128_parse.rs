// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use amunchain_dex::core::math::U128;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(v) = s.parse::<U128>() {
            let back: U128 = v.to_string().parse().expect("display output parses");
            assert_eq!(back, v);
        }
    }
});
