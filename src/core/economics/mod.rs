#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Staking economics.

pub mod staking;
