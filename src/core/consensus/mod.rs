#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Proof-of-stake block timing and the mining controller.

pub mod pos_miner;
pub mod stake_timing;
