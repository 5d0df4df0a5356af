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

use crate::core::error::ErrorKind;
use prometheus::{IntCounter, IntGauge, Registry};
use thiserror::Error;

/// Metrics errors.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Metric construction or registration failed.
    #[error("prometheus")]
    Prom,
}

impl MetricsError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StateError
    }
}

/// Metrics container.
#[derive(Clone)]
pub struct Metrics {
    /// Registry.
    pub registry: Registry,

    /// Exchange rounds that submitted a transaction.
    pub exchange_rounds_total: IntCounter,
    /// Exchanges that ended with a confirmed transaction.
    pub exchanges_completed_total: IntCounter,
    /// Exchanges that ended in failure (any reason).
    pub exchanges_failed_total: IntCounter,
    /// Exchanges aborted because the price moved too far.
    pub exchange_slippage_aborts_total: IntCounter,

    /// Chain height seen by the PoS miner.
    pub pos_chain_height: IntGauge,
    /// PoS blocks submitted.
    pub pos_blocks_submitted_total: IntCounter,
    /// PoS attempts lost to another staker.
    pub pos_blocks_lost_total: IntCounter,

    /// Scheduler tasks dispatched.
    pub scheduler_tasks_fired_total: IntCounter,
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter, MetricsError> {
    let c = IntCounter::new(name, help).map_err(|_| MetricsError::Prom)?;
    registry
        .register(Box::new(c.clone()))
        .map_err(|_| MetricsError::Prom)?;
    Ok(c)
}

impl Metrics {
    /// Create and register metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let pos_chain_height = IntGauge::new("amunchain_pos_chain_height", "Chain height seen by the PoS miner")
            .map_err(|_| MetricsError::Prom)?;
        registry
            .register(Box::new(pos_chain_height.clone()))
            .map_err(|_| MetricsError::Prom)?;

        Ok(Self {
            exchange_rounds_total: counter(
                &registry,
                "amunchain_exchange_rounds_total",
                "Exchange rounds submitted",
            )?,
            exchanges_completed_total: counter(
                &registry,
                "amunchain_exchanges_completed_total",
                "Exchanges completed",
            )?,
            exchanges_failed_total: counter(
                &registry,
                "amunchain_exchanges_failed_total",
                "Exchanges failed",
            )?,
            exchange_slippage_aborts_total: counter(
                &registry,
                "amunchain_exchange_slippage_aborts_total",
                "Exchanges aborted on slippage",
            )?,
            pos_chain_height,
            pos_blocks_submitted_total: counter(
                &registry,
                "amunchain_pos_blocks_submitted_total",
                "PoS blocks submitted",
            )?,
            pos_blocks_lost_total: counter(
                &registry,
                "amunchain_pos_blocks_lost_total",
                "PoS attempts lost to another staker",
            )?,
            scheduler_tasks_fired_total: counter(
                &registry,
                "amunchain_scheduler_tasks_fired_total",
                "Scheduler tasks dispatched",
            )?,
            registry,
        })
    }
}
