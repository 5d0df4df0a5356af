#![forbid(unsafe_code)]
#![allow(missing_docs)]

//! Observability: prometheus metrics and tracing subscriber setup.

pub mod logging;
pub mod metrics;
