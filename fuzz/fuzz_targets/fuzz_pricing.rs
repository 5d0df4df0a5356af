// Copyright (c) 2026 Amunchain
// Licensed under the Apache-2.0 License.

#![no_main]
#![forbid(unsafe_code)]

use amunchain_dex::core::dex::pricing::{buy_amount, inverse_buy_amount, sell_amount};
use amunchain_dex::core::types::AmountRatio;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct Quote {
    reserve1: u64,
    reserve2: u64,
    amount: u64,
    interest: u16,
}

fuzz_target!(|q: Quote| {
    let ratio = AmountRatio::new(q.reserve1, q.reserve2);
    let interest = u32::from(q.interest);

    if let Ok(out) = sell_amount(ratio, q.amount, interest) {
        assert!(out <= q.reserve2);
    }
    if let (Ok(with_fee), Ok(without)) = (
        buy_amount(ratio, q.amount, interest),
        buy_amount(ratio, q.amount, 0),
    ) {
        assert!(with_fee >= without);
    }
    let _ = inverse_buy_amount(ratio, q.amount, interest);
});
