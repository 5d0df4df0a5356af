#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Decentralised exchange: pricing, pool naming, path planning and the
//! multi-round exchanger.

pub mod exchanger;
pub mod naming;
pub mod planner;
pub mod pricing;
