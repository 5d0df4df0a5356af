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

//! Slippage-guarded multi-round exchanger.
//!
//! An exchange is retried in rounds. Each round re-reads the pool, re-quotes,
//! compares the quote with the first round's and, if the price has not moved
//! more than allowed against the caller, submits one transaction. The first
//! of those transactions to confirm completes the exchange.
//!
//! [`ExchangeMachine`] holds the state and the round logic. [`Exchanger`] runs
//! it as an actor fed by a bounded command channel, so block and transaction
//! events never race with a round in flight.

use crate::core::config::ExchangeConfig;
use crate::core::dex::naming::tokens_to_lpname;
use crate::core::dex::planner::pools_to_composite_exchange_transfer;
use crate::core::error::ErrorKind;
use crate::core::interfaces::{ChainState, TokenRegistry, Wallet};
use crate::core::types::{
    CompositeTransfer, CompositeTransferRequest, NetworkAddresses, Side, TokenId, TxId,
};
use crate::monitoring::metrics::Metrics;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Exchanger errors. Exchange failures themselves go to the callbacks.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ExchangerError {
    /// The actor has stopped.
    #[error("exchanger stopped")]
    Stopped,
}

impl ExchangerError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::StateError
    }
}

/// Exchange lifecycle state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExchangeState {
    /// No exchange running.
    #[default]
    Completed,
    /// Rounds are being submitted.
    InProgress,
}

/// Snapshot handed to the callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct ExchangeReport {
    /// False on any failure.
    pub success: bool,
    /// True when the exchange is over.
    pub terminal: bool,
    /// Human-readable status.
    pub message: String,
    /// Requested/derived ratio of the first round.
    pub initial_ratio: f64,
    /// Requested/derived ratio of the latest round.
    pub current_ratio: f64,
    /// Adverse price movement since the first round, as a fraction.
    pub slippage: f64,
    /// Rounds submitted so far.
    pub round: u32,
    /// Transaction of the round, if any.
    pub txid: Option<TxId>,
}

/// Callback receiving exchange reports.
pub type ReportCallback = Box<dyn Fn(ExchangeReport) + Send + Sync>;

/// Everything an exchange needs from its caller.
pub struct ExchangeParams {
    /// Wallet account paying and receiving.
    pub subaddress_account: u32,
    /// What to exchange.
    pub request: CompositeTransferRequest,
    /// Called after every round.
    pub on_round: ReportCallback,
    /// Called when the exchange ends, and again for a later stop or a late
    /// confirmation.
    pub on_finished: ReportCallback,
    /// Round budget.
    pub max_rounds: u32,
    /// Largest tolerated adverse movement, as a fraction.
    pub max_slippage: f64,
    /// Decoys per ring.
    pub fake_outs: usize,
}

impl ExchangeParams {
    /// Params with budget, slippage and ring size taken from `config`.
    pub fn with_defaults(
        subaddress_account: u32,
        request: CompositeTransferRequest,
        config: &ExchangeConfig,
        on_round: ReportCallback,
        on_finished: ReportCallback,
    ) -> Self {
        Self {
            subaddress_account,
            request,
            on_round,
            on_finished,
            max_rounds: config.default_max_rounds,
            max_slippage: config.default_max_slippage,
            fake_outs: config.default_fake_outs,
        }
    }
}

impl fmt::Debug for ExchangeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeParams")
            .field("subaddress_account", &self.subaddress_account)
            .field("request", &self.request)
            .field("max_rounds", &self.max_rounds)
            .field("max_slippage", &self.max_slippage)
            .field("fake_outs", &self.fake_outs)
            .finish_non_exhaustive()
    }
}

/// What a submitted round looked like.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RoundInfo {
    ratio: f64,
    slippage: f64,
    round: u32,
}

/// Collaborators of the exchanger.
#[derive(Clone)]
pub struct ExchangeDeps {
    /// Daemon view.
    pub chain: Arc<dyn ChainState>,
    /// Local wallet.
    pub wallet: Arc<dyn Wallet>,
    /// Token names.
    pub registry: Arc<dyn TokenRegistry>,
    /// LP account address and friends.
    pub addresses: NetworkAddresses,
    /// Metrics sink.
    pub metrics: Option<Arc<Metrics>>,
}

/// Exchange state machine.
pub struct ExchangeMachine {
    deps: ExchangeDeps,
    blocks_between_rounds: u64,
    state: ExchangeState,
    params: Option<ExchangeParams>,
    pending: BTreeMap<TxId, RoundInfo>,
    initial_ratio: Option<f64>,
    current_ratio: f64,
    current_slippage: f64,
    current_round: u32,
    next_round_height: Option<u64>,
}

impl ExchangeMachine {
    /// Idle machine.
    pub fn new(deps: ExchangeDeps, config: &ExchangeConfig) -> Self {
        Self {
            deps,
            blocks_between_rounds: config.blocks_between_rounds.max(1),
            state: ExchangeState::Completed,
            params: None,
            pending: BTreeMap::new(),
            initial_ratio: None,
            current_ratio: 0.0,
            current_slippage: 0.0,
            current_round: 0,
            next_round_height: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Rounds submitted in the current exchange.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Transactions awaiting confirmation.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Start a new exchange and run its first round.
    pub async fn exchange(&mut self, params: ExchangeParams) {
        if self.state == ExchangeState::InProgress {
            warn!(round = self.current_round, "replacing exchange in progress");
            self.finish(false, "exchange replaced by a new exchange".to_string(), None);
        }
        info!(
            source = %params.request.source,
            destination = %params.request.destination,
            amount = params.request.amount,
            side = %params.request.side,
            max_rounds = params.max_rounds,
            max_slippage = params.max_slippage,
            "exchange started"
        );
        self.pending.clear();
        self.initial_ratio = None;
        self.current_ratio = 0.0;
        self.current_slippage = 0.0;
        self.current_round = 0;
        self.next_round_height = None;
        self.params = Some(params);
        self.state = ExchangeState::InProgress;
        self.exchange_round().await;
    }

    /// One quote-check-submit round.
    pub async fn exchange_round(&mut self) {
        if self.state == ExchangeState::Completed {
            return;
        }
        let Some((request, account, fake_outs, max_slippage, max_rounds)) =
            self.params.as_ref().map(|p| {
                (p.request, p.subaddress_account, p.fake_outs, p.max_slippage, p.max_rounds)
            })
        else {
            return;
        };
        if self.current_round >= max_rounds {
            self.finish(false, "exceeded maximal tries".to_string(), None);
            return;
        }

        let transfer = match self.quote(&request).await {
            Ok(t) => t,
            Err(message) => {
                self.finish(false, message, None);
                return;
            }
        };

        let derived = match request.side {
            Side::Buy => transfer.amount_in,
            Side::Sell => transfer.amount_out,
        };
        let ratio = request.amount as f64 / derived as f64;
        let initial = *self.initial_ratio.get_or_insert(ratio);
        self.current_ratio = ratio;
        self.current_slippage = match request.side {
            Side::Buy => (initial - ratio) / initial,
            Side::Sell => (ratio - initial) / initial,
        };
        debug!(
            round = self.current_round,
            ratio,
            slippage = self.current_slippage,
            "exchange quoted"
        );
        if self.current_slippage > max_slippage {
            if let Some(m) = &self.deps.metrics {
                m.exchange_slippage_aborts_total.inc();
            }
            self.finish(false, "exceeded slippage range".to_string(), None);
            return;
        }

        let wallet_address = self.deps.wallet.address(account);
        let legs = transfer.legs(&self.deps.addresses, &wallet_address);
        let txs = match self
            .deps
            .wallet
            .build_exchange_transactions(account, &transfer, &legs, fake_outs)
            .await
        {
            Ok(txs) => txs,
            Err(e) => {
                self.finish(false, format!("failed to build exchange transaction: {e}"), None);
                return;
            }
        };
        let [tx] = txs.as_slice() else {
            self.finish(
                false,
                format!("expected one exchange transaction, got {}", txs.len()),
                None,
            );
            return;
        };
        let tx = tx.clone();

        let summary = self.round_summary(&transfer, tx.fee);
        self.report_round(true, summary, Some(tx.txid));
        self.current_round += 1;
        if let Some(m) = &self.deps.metrics {
            m.exchange_rounds_total.inc();
        }

        if let Err(e) = self.deps.wallet.commit(&tx).await {
            warn!(round = self.current_round, error = %e, "exchange commit failed");
            self.report_round(false, format!("failed to commit transaction: {e}"), Some(tx.txid));
            return;
        }
        info!(round = self.current_round, txid = %tx.txid, "exchange round submitted");
        self.pending.insert(
            tx.txid,
            RoundInfo {
                ratio,
                slippage: self.current_slippage,
                round: self.current_round,
            },
        );
    }

    async fn quote(&self, request: &CompositeTransferRequest) -> Result<CompositeTransfer, String> {
        let registry = self.deps.registry.as_ref();
        if !registry.is_native_coin(request.source) && !registry.is_native_coin(request.destination) {
            return Err("cross exchange not supported".to_string());
        }
        let pool_name = tokens_to_lpname(registry, request.source, request.destination)
            .map_err(|e| format!("invalid token pair: {e}"))?;
        let pool = self
            .deps
            .chain
            .get_pool(&pool_name)
            .await
            .map_err(|e| format!("failed to get pool {pool_name}: {e}"))?;
        if registry.is_native_coin(pool.token1) {
            return Err(format!("invalid pool {pool_name}: native coin as token1"));
        }
        pools_to_composite_exchange_transfer(std::slice::from_ref(&pool), request)
            .map_err(|e| format!("failed to quote exchange: {e}"))
    }

    fn round_summary(&self, transfer: &CompositeTransfer, fee: u64) -> String {
        let name = |id: TokenId| {
            self.deps
                .registry
                .token_id_to_name(id)
                .unwrap_or_else(|| id.to_string())
        };
        let impact = transfer
            .transfers
            .first()
            .map(|t| t.price_impact())
            .unwrap_or_default();
        format!(
            "round {}: pay {} {} for {} {}, rate {:.6}, fee {}, price impact {:.2}%, slippage {:.2}%",
            self.current_round + 1,
            transfer.amount_in,
            name(transfer.request.source),
            transfer.amount_out,
            name(transfer.request.destination),
            self.current_ratio,
            fee,
            impact,
            self.current_slippage * 100.0
        )
    }

    /// A new block arrived.
    pub async fn process_block(&mut self, height: u64) {
        if self.state != ExchangeState::InProgress {
            return;
        }
        let next = *self
            .next_round_height
            .get_or_insert(height.saturating_add(self.blocks_between_rounds));
        if self.pending.is_empty() || height >= next {
            debug!(height, pending = self.pending.len(), "exchange round triggered");
            self.next_round_height = Some(height.saturating_add(self.blocks_between_rounds));
            self.exchange_round().await;
        }
    }

    /// A transaction confirmed.
    pub fn process_tx(&mut self, txid: TxId) {
        let Some(info) = self.pending.remove(&txid) else {
            return;
        };
        self.current_ratio = info.ratio;
        self.current_slippage = info.slippage;
        self.current_round = info.round;
        if self.state == ExchangeState::InProgress {
            self.pending.clear();
            self.finish(true, "exchange completed".to_string(), Some(txid));
        } else {
            warn!(%txid, "exchange transaction confirmed after completion");
            self.finish(
                false,
                "internal error: transaction confirmed after exchange completed".to_string(),
                Some(txid),
            );
        }
    }

    /// Abandon the exchange. Already-relayed transactions may still confirm
    /// but no longer affect anything. The stop is always reported to the
    /// last exchange's caller, even if that exchange had already ended.
    pub fn stop(&mut self) {
        self.pending.clear();
        info!(round = self.current_round, state = ?self.state, "exchange stopped by user");
        self.finish(false, "exchange stopped by user".to_string(), None);
    }

    fn report(&self, success: bool, terminal: bool, message: String, txid: Option<TxId>) -> ExchangeReport {
        ExchangeReport {
            success,
            terminal,
            message,
            initial_ratio: self.initial_ratio.unwrap_or_default(),
            current_ratio: self.current_ratio,
            slippage: self.current_slippage,
            round: self.current_round,
            txid,
        }
    }

    fn report_round(&self, success: bool, message: String, txid: Option<TxId>) {
        if let Some(params) = &self.params {
            (params.on_round)(self.report(success, false, message, txid));
        }
    }

    fn finish(&mut self, success: bool, message: String, txid: Option<TxId>) {
        let was_running = std::mem::replace(&mut self.state, ExchangeState::Completed)
            == ExchangeState::InProgress;
        if success {
            info!(round = self.current_round, "exchange finished");
        } else {
            warn!(round = self.current_round, reason = %message, "exchange failed");
        }
        // only the transition out of a running exchange is counted
        if let Some(m) = self.deps.metrics.as_ref().filter(|_| was_running) {
            if success {
                m.exchanges_completed_total.inc();
            } else {
                m.exchanges_failed_total.inc();
            }
        }
        if let Some(params) = &self.params {
            (params.on_finished)(self.report(success, true, message, txid));
        }
    }
}

enum Command {
    Exchange(ExchangeParams, oneshot::Sender<()>),
    TxConfirmed(TxId, oneshot::Sender<()>),
    BlockAdvanced(u64, oneshot::Sender<()>),
    Stop(oneshot::Sender<()>),
}

/// Handle to the exchanger actor.
pub struct Exchanger {
    tx: mpsc::Sender<Command>,
    state: watch::Receiver<ExchangeState>,
    join: JoinHandle<()>,
}

impl Exchanger {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(deps: ExchangeDeps, config: &ExchangeConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<Command>(config.event_queue_depth.max(1));
        let (state_tx, state_rx) = watch::channel(ExchangeState::Completed);
        let mut machine = ExchangeMachine::new(deps, config);

        let join = tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                let ack = match cmd {
                    Command::Exchange(params, ack) => {
                        machine.exchange(params).await;
                        ack
                    }
                    Command::TxConfirmed(txid, ack) => {
                        machine.process_tx(txid);
                        ack
                    }
                    Command::BlockAdvanced(height, ack) => {
                        machine.process_block(height).await;
                        ack
                    }
                    Command::Stop(ack) => {
                        machine.stop();
                        ack
                    }
                };
                state_tx.send_replace(machine.state());
                let _ = ack.send(());
            }
            debug!("exchanger command channel closed");
        });

        Self {
            tx,
            state: state_rx,
            join,
        }
    }

    async fn call(&self, make: impl FnOnce(oneshot::Sender<()>) -> Command) -> Result<(), ExchangerError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(make(ack_tx))
            .await
            .map_err(|_| ExchangerError::Stopped)?;
        ack_rx.await.map_err(|_| ExchangerError::Stopped)
    }

    /// Start an exchange; returns once its first round has run.
    pub async fn exchange(&self, params: ExchangeParams) -> Result<(), ExchangerError> {
        self.call(|ack| Command::Exchange(params, ack)).await
    }

    /// True while an exchange is running.
    pub fn in_progress(&self) -> bool {
        *self.state.borrow() == ExchangeState::InProgress
    }

    /// Watch the exchange state.
    pub fn subscribe(&self) -> watch::Receiver<ExchangeState> {
        self.state.clone()
    }

    /// Abandon the running exchange.
    pub async fn stop_exchange(&self) -> Result<(), ExchangerError> {
        self.call(Command::Stop).await
    }

    /// Feed a confirmed transaction.
    pub async fn process_tx(&self, txid: TxId) -> Result<(), ExchangerError> {
        self.call(|ack| Command::TxConfirmed(txid, ack)).await
    }

    /// Feed a new block height.
    pub async fn process_block(&self, height: u64) -> Result<(), ExchangerError> {
        self.call(|ack| Command::BlockAdvanced(height, ack)).await
    }

    /// Close the command channel and wait for the actor to drain.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.join.await;
    }
}
