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
#![warn(missing_docs)]

//! Amunchain DEX core.
//!
//! This crate provides:
//! - Overflow-checked 128-bit arithmetic and a fixed-point CORDIC arctangent
//! - Constant-product pool pricing, pool naming and multi-hop exchange planning
//! - A slippage-guarded exchanger that retries an exchange over several rounds
//! - A time-ordered task scheduler and the PoS mining controller built on it
//! - Monitoring via Prometheus metrics and structured logging

/// Core primitives (math, DEX, scheduling, staking, consensus).
pub mod core;
/// Observability (metrics, logging setup).
pub mod monitoring;
