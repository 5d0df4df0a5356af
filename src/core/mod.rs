#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Core: arithmetic, DEX, scheduling, staking and PoS mining.

pub mod config;
pub mod consensus;
pub mod dex;
pub mod economics;
pub mod error;
pub mod interfaces;
pub mod math;
pub mod runtime;
pub mod security;
pub mod types;
