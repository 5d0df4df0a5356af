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
#![deny(missing_docs)]

//! PoS mining controller.
//!
//! The controller polls the chain head. When it moves, the best staking
//! output is chosen and its next-block time computed; a mining task is
//! scheduled shortly before that time, replacing any earlier one. When the
//! task fires and the head has not moved, the block is built and submitted.
//! If it has moved, somebody else mined it and the attempt is dropped.
//!
//! [`PosController`] is the state machine; [`PosMiner`] runs it as an actor
//! driven by the scheduler.

use crate::core::config::MiningConfig;
use crate::core::consensus::stake_timing::stake_details;
use crate::core::economics::staking::{select_candidate, StakePolicy};
use crate::core::interfaces::{ChainState, CollaboratorError, FastHash, Wallet};
use crate::core::runtime::scheduler::{job, Scheduler, TaskHandle};
use crate::core::types::{ChainHead, StakeDetails, TokenId, H256};
use crate::monitoring::metrics::Metrics;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Collaborators of the PoS controller.
#[derive(Clone)]
pub struct PosDeps {
    /// Daemon view.
    pub chain: Arc<dyn ChainState>,
    /// Local wallet.
    pub wallet: Arc<dyn Wallet>,
    /// Hash used for PoS hashes.
    pub hasher: Arc<dyn FastHash>,
    /// Native coin.
    pub native: TokenId,
    /// Metrics sink.
    pub metrics: Option<Arc<Metrics>>,
}

/// Snapshot of the miner.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PosMetrics {
    /// True between `start_mining` and `stop_mining`.
    pub mining: bool,
    /// Last chain height seen.
    pub chain_height: u64,
    /// Amount of the currently planned stake.
    pub candidate_amount: Option<u64>,
    /// Planned next-block timestamp (ms).
    pub next_block_timestamp_ms: Option<u64>,
    /// Blocks submitted.
    pub blocks_submitted: u64,
    /// Attempts lost to another staker.
    pub blocks_lost: u64,
    /// Last collaborator error.
    pub last_error: Option<String>,
}

/// Result of a chain-head poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeadOutcome {
    /// Same head as last time.
    Unchanged,
    /// New head; mine with `details` on top of `head`.
    Scheduled {
        /// Head the block builds on.
        head: ChainHead,
        /// Selected stake.
        details: StakeDetails,
    },
    /// New head but nothing can stake.
    NoCandidate,
    /// A collaborator failed; the cycle is skipped.
    Failed(CollaboratorError),
}

/// Result of a mining attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MineOutcome {
    /// Block submitted.
    Submitted(H256),
    /// The head moved before our slot.
    Lost,
    /// Nothing can stake any more.
    NoCandidate,
    /// A collaborator failed.
    Failed(CollaboratorError),
}

/// PoS state machine.
pub struct PosController {
    deps: PosDeps,
    policy: StakePolicy,
    knee: u64,
    reward_address: Option<String>,
    last_head: Option<ChainHead>,
    metrics: PosMetrics,
}

impl PosController {
    /// Idle controller.
    pub fn new(deps: PosDeps, config: &MiningConfig) -> Self {
        let policy = StakePolicy {
            native: deps.native,
            min_amount: config.min_stake_amount,
            maturity_blocks: config.stake_maturity_blocks,
        };
        Self {
            deps,
            policy,
            knee: config.stake_knee,
            reward_address: None,
            last_head: None,
            metrics: PosMetrics::default(),
        }
    }

    /// Begin mining to `reward_address`; false if already mining.
    pub fn start(&mut self, reward_address: String) -> bool {
        if self.reward_address.is_some() {
            return false;
        }
        info!(%reward_address, "pos mining started");
        self.reward_address = Some(reward_address);
        self.last_head = None;
        self.metrics.mining = true;
        true
    }

    /// Stop mining and forget the planned block.
    pub fn stop(&mut self) {
        if self.reward_address.take().is_some() {
            info!("pos mining stopped");
        }
        self.last_head = None;
        self.metrics.mining = false;
        self.metrics.candidate_amount = None;
        self.metrics.next_block_timestamp_ms = None;
    }

    /// True while mining.
    pub fn is_mining(&self) -> bool {
        self.reward_address.is_some()
    }

    /// Head the current plan builds on.
    pub fn planned_head(&self) -> Option<ChainHead> {
        self.last_head
    }

    /// Current snapshot.
    pub fn metrics(&self) -> &PosMetrics {
        &self.metrics
    }

    fn record_error(&mut self, e: &CollaboratorError) {
        warn!(error = %e, "pos cycle skipped");
        self.metrics.last_error = Some(e.to_string());
    }

    async fn derive(&self) -> Result<Option<StakeDetails>, CollaboratorError> {
        let info = self.deps.chain.get_mining_info().await?;
        let outputs = self.deps.wallet.list_unspent_outputs().await?;
        let wallet = self.deps.wallet.as_ref();
        let candidate = select_candidate(
            &outputs,
            &self.policy,
            self.deps.hasher.as_ref(),
            |o| wallet.is_unlocked(o),
            info.height,
            &info.pos_hash,
        );
        Ok(candidate.map(|c| stake_details(&c, &info, self.knee)))
    }

    /// Poll the head and plan the next block if it moved.
    pub async fn on_chain_head(&mut self) -> HeadOutcome {
        if !self.is_mining() {
            return HeadOutcome::Unchanged;
        }
        let head = match self.deps.chain.get_chain_head().await {
            Ok(h) => h,
            Err(e) => {
                self.record_error(&e);
                return HeadOutcome::Failed(e);
            }
        };
        if self.last_head == Some(head) {
            return HeadOutcome::Unchanged;
        }
        self.last_head = Some(head);
        self.metrics.chain_height = head.height;
        if let Some(m) = &self.deps.metrics {
            m.pos_chain_height.set(i64::try_from(head.height).unwrap_or(i64::MAX));
        }

        match self.derive().await {
            Ok(Some(details)) => {
                debug!(
                    height = head.height,
                    amount = details.amount,
                    next_block_ms = details.next_block_timestamp_ms,
                    "pos block planned"
                );
                self.metrics.candidate_amount = Some(details.amount);
                self.metrics.next_block_timestamp_ms = Some(details.next_block_timestamp_ms);
                HeadOutcome::Scheduled { head, details }
            }
            Ok(None) => {
                debug!(height = head.height, "no stakeable output");
                self.metrics.candidate_amount = None;
                self.metrics.next_block_timestamp_ms = None;
                HeadOutcome::NoCandidate
            }
            Err(e) => {
                // forget the head so the next poll retries
                self.last_head = None;
                self.record_error(&e);
                HeadOutcome::Failed(e)
            }
        }
    }

    /// Mine on top of `expected` if it is still the head.
    pub async fn on_mine_due(&mut self, expected: ChainHead) -> MineOutcome {
        let Some(reward_address) = self.reward_address.clone() else {
            return MineOutcome::NoCandidate;
        };
        let head = match self.deps.chain.get_chain_head().await {
            Ok(h) => h,
            Err(e) => {
                self.record_error(&e);
                return MineOutcome::Failed(e);
            }
        };
        if head != expected {
            info!(expected = expected.height, head = head.height, "somebody else mined it");
            self.metrics.blocks_lost += 1;
            if let Some(m) = &self.deps.metrics {
                m.pos_blocks_lost_total.inc();
            }
            return MineOutcome::Lost;
        }
        let details = match self.derive().await {
            Ok(Some(d)) => d,
            Ok(None) => return MineOutcome::NoCandidate,
            Err(e) => {
                self.record_error(&e);
                return MineOutcome::Failed(e);
            }
        };
        match self
            .deps
            .wallet
            .build_and_submit_pos_block(&details, &reward_address)
            .await
        {
            Ok(hash) => {
                info!(height = head.height + 1, block = %hash, amount = details.amount, "pos block submitted");
                self.metrics.blocks_submitted += 1;
                if let Some(m) = &self.deps.metrics {
                    m.pos_blocks_submitted_total.inc();
                }
                MineOutcome::Submitted(hash)
            }
            Err(e) => {
                self.record_error(&e);
                MineOutcome::Failed(e)
            }
        }
    }
}

enum PosEvent {
    Poll,
    MineDue(ChainHead, u64),
    Start(String, oneshot::Sender<bool>),
    Stop(oneshot::Sender<()>),
}

struct PosActor {
    controller: PosController,
    scheduler: Scheduler,
    events: mpsc::WeakSender<PosEvent>,
    poll_interval: Duration,
    lead_ms: u64,
    poll_task: Option<TaskHandle>,
    // sequence number of the live mining task, echoed back by its MineDue
    mine_task: Option<(u64, TaskHandle)>,
    mine_seq: u64,
}

impl PosActor {
    fn new(
        controller: PosController,
        scheduler: Scheduler,
        events: mpsc::WeakSender<PosEvent>,
        config: &MiningConfig,
    ) -> Self {
        Self {
            controller,
            scheduler,
            events,
            poll_interval: Duration::from_millis(config.poll_interval_ms.max(1)),
            lead_ms: config.block_assembly_lead_ms,
            poll_task: None,
            mine_task: None,
            mine_seq: 0,
        }
    }

    fn cancel_mining(&mut self) {
        if let Some((_, handle)) = self.mine_task.take() {
            self.scheduler.remove(handle);
        }
    }

    fn cancel_tasks(&mut self) {
        if let Some(handle) = self.poll_task.take() {
            self.scheduler.remove(handle);
        }
        self.cancel_mining();
    }

    fn start(&mut self, reward_address: String) -> bool {
        if !self.controller.start(reward_address) {
            return false;
        }
        let events = self.events.clone();
        let poll = job(move || {
            let events = events.clone();
            async move {
                if let Some(tx) = events.upgrade() {
                    // a full queue already has a poll or a mining event in it
                    let _ = tx.try_send(PosEvent::Poll);
                }
            }
        });
        match self.scheduler.schedule_every(poll, Instant::now(), self.poll_interval) {
            Ok(handle) => {
                self.poll_task = Some(handle);
                true
            }
            Err(e) => {
                warn!(error = %e, "cannot schedule chain polling");
                self.controller.stop();
                false
            }
        }
    }

    fn schedule_mining(&mut self, head: ChainHead, details: &StakeDetails) {
        self.cancel_mining();
        self.mine_seq += 1;
        let seq = self.mine_seq;
        let fire_ms = details.next_block_timestamp_ms.saturating_sub(self.lead_ms);
        let at = Instant::now() + Duration::from_millis(fire_ms.saturating_sub(now_ms()));
        let events = self.events.clone();
        let mine = job(move || {
            let events = events.clone();
            async move {
                if let Some(tx) = events.upgrade() {
                    let _ = tx.send(PosEvent::MineDue(head, seq)).await;
                }
            }
        });
        match self.scheduler.schedule_at(mine, at) {
            Ok(handle) => self.mine_task = Some((seq, handle)),
            Err(e) => warn!(error = %e, "cannot schedule mining"),
        }
    }

    async fn handle(&mut self, event: PosEvent) {
        match event {
            PosEvent::Poll => match self.controller.on_chain_head().await {
                HeadOutcome::Scheduled { head, details } => self.schedule_mining(head, &details),
                HeadOutcome::NoCandidate => self.cancel_mining(),
                HeadOutcome::Unchanged | HeadOutcome::Failed(_) => {}
            },
            PosEvent::MineDue(head, seq) => {
                // a replaced or cancelled task may still have its event queued
                if !matches!(self.mine_task, Some((live, _)) if live == seq) {
                    debug!(seq, height = head.height, "stale mining task skipped");
                    return;
                }
                self.mine_task = None;
                if self.controller.planned_head() != Some(head) {
                    debug!(seq, height = head.height, "mining task for an abandoned plan skipped");
                    return;
                }
                let outcome = self.controller.on_mine_due(head).await;
                debug!(?outcome, "mining attempt finished");
            }
            PosEvent::Start(reward_address, ack) => {
                let started = self.start(reward_address);
                let _ = ack.send(started);
            }
            PosEvent::Stop(ack) => {
                self.cancel_tasks();
                self.controller.stop();
                let _ = ack.send(());
            }
        }
    }
}

/// Handle to the PoS miner actor.
pub struct PosMiner {
    tx: mpsc::Sender<PosEvent>,
    metrics: watch::Receiver<PosMetrics>,
    join: JoinHandle<()>,
}

impl PosMiner {
    /// Spawn the actor and its scheduler on the current tokio runtime.
    pub fn spawn(deps: PosDeps, config: &MiningConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<PosEvent>(config.event_queue_depth.max(1));
        let (metrics_tx, metrics_rx) = watch::channel(PosMetrics::default());
        let scheduler = match &deps.metrics {
            Some(m) => Scheduler::with_metrics(m.clone()),
            None => Scheduler::new(),
        };
        let mut actor = PosActor::new(
            PosController::new(deps, config),
            scheduler,
            tx.downgrade(),
            config,
        );

        let join = tokio::spawn(async move {
            if let Err(e) = actor.scheduler.start() {
                warn!(error = %e, "pos scheduler failed to start");
                return;
            }
            while let Some(event) = rx.recv().await {
                actor.handle(event).await;
                metrics_tx.send_replace(actor.controller.metrics().clone());
            }
            actor.scheduler.shutdown();
            debug!("pos miner stopped");
        });

        Self {
            tx,
            metrics: metrics_rx,
            join,
        }
    }

    /// Start mining to `reward_address`. False if already mining.
    pub async fn start_mining(&self, reward_address: impl Into<String>) -> bool {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self
            .tx
            .send(PosEvent::Start(reward_address.into(), ack_tx))
            .await
            .is_err()
        {
            return false;
        }
        ack_rx.await.unwrap_or(false)
    }

    /// Stop mining; pending poll and mining tasks are cancelled.
    pub async fn stop_mining(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(PosEvent::Stop(ack_tx)).await.is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Latest snapshot.
    pub fn pos_metrics(&self) -> PosMetrics {
        self.metrics.borrow().clone()
    }

    /// Stop the actor and wait for it.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.join.await;
    }
}
