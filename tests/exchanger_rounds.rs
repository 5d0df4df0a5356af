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

mod common;

use amunchain_dex::core::config::ExchangeConfig;
use amunchain_dex::core::dex::exchanger::{
    ExchangeDeps, ExchangeParams, ExchangeReport, ExchangeState, Exchanger,
};
use amunchain_dex::core::types::{CompositeTransferRequest, Side, TokenId};
use amunchain_dex::monitoring::metrics::Metrics;
use common::{addresses, pool, registry, MockChain, MockWallet, ABC, AMUN, ZED};
use parking_lot::Mutex;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const POOL: &str = "AMUN/ZED";

struct Harness {
    chain: Arc<MockChain>,
    wallet: Arc<MockWallet>,
    metrics: Arc<Metrics>,
    exchanger: Exchanger,
    rounds: Arc<Mutex<Vec<ExchangeReport>>>,
    finished: Arc<Mutex<Vec<ExchangeReport>>>,
}

impl Harness {
    fn new() -> Self {
        let chain = Arc::new(MockChain::default());
        chain.set_pool(POOL, pool(10, ZED, AMUN, 1_000_000, 2_000_000));
        let wallet = Arc::new(MockWallet::default());
        let metrics = Arc::new(Metrics::new().unwrap());
        let deps = ExchangeDeps {
            chain: chain.clone(),
            wallet: wallet.clone(),
            registry: Arc::new(registry()),
            addresses: addresses(),
            metrics: Some(metrics.clone()),
        };
        Self {
            chain,
            wallet,
            metrics,
            exchanger: Exchanger::spawn(deps, &ExchangeConfig::default()),
            rounds: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn params(&self, max_rounds: u32, max_slippage: f64) -> ExchangeParams {
        self.params_for(ZED, AMUN, self.finished.clone(), max_rounds, max_slippage)
    }

    fn params_for(
        &self,
        source: TokenId,
        destination: TokenId,
        finished: Arc<Mutex<Vec<ExchangeReport>>>,
        max_rounds: u32,
        max_slippage: f64,
    ) -> ExchangeParams {
        let rounds = self.rounds.clone();
        ExchangeParams {
            subaddress_account: 0,
            request: CompositeTransferRequest {
                source,
                destination,
                amount: 1_000,
                pool_interest: 0,
                side: Side::Sell,
            },
            on_round: Box::new(move |r| rounds.lock().push(r)),
            on_finished: Box::new(move |r| finished.lock().push(r)),
            max_rounds,
            max_slippage,
            fake_outs: 15,
        }
    }

    fn finished(&self) -> Vec<ExchangeReport> {
        self.finished.lock().clone()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn first_confirmation_completes_the_exchange() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert!(h.exchanger.in_progress());

    let committed = h.wallet.committed.lock().clone();
    assert_eq!(committed.len(), 1);
    let rounds = h.rounds.lock().clone();
    assert_eq!(rounds.len(), 1);
    assert!(rounds[0].success && !rounds[0].terminal);
    assert!(rounds[0].message.contains("ZED"), "{}", rounds[0].message);

    let (transfer, legs) = h.wallet.built.lock()[0].clone();
    assert_eq!(transfer.amount_out, 1_998);
    assert_eq!(legs[0].destination_address, "lp-account");
    assert_eq!(legs[1].destination_address, "wallet-0");

    h.exchanger.process_tx(committed[0]).await.unwrap();
    assert!(!h.exchanger.in_progress());
    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].success && finished[0].terminal);
    assert_eq!(finished[0].round, 1);
    assert_eq!(finished[0].txid, Some(committed[0]));
    assert_eq!(h.metrics.exchanges_completed_total.get(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn price_move_beyond_slippage_aborts_before_round_two() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert_eq!(h.wallet.committed.lock().len(), 1);

    // half the destination reserve: the same sale now yields half as much
    h.chain.set_pool(POOL, pool(10, ZED, AMUN, 1_000_000, 1_000_000));
    h.exchanger.process_block(100).await.unwrap();
    assert!(h.finished().is_empty(), "pending round must wait for the retry window");
    h.exchanger.process_block(105).await.unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert!(!finished[0].success);
    assert_eq!(finished[0].message, "exceeded slippage range");
    assert!(finished[0].slippage > 0.05);
    assert_eq!(h.wallet.built.lock().len(), 1);
    assert_eq!(h.wallet.committed.lock().len(), 1);
    assert!(!h.exchanger.in_progress());
    assert_eq!(h.metrics.exchange_slippage_aborts_total.get(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn round_budget_is_enforced() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(1, 0.05)).await.unwrap();
    h.exchanger.process_block(10).await.unwrap();
    h.exchanger.process_block(15).await.unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert!(!finished[0].success);
    assert_eq!(finished[0].message, "exceeded maximal tries");
    assert_eq!(h.wallet.built.lock().len(), 1);
    assert_eq!(*h.exchanger.subscribe().borrow(), ExchangeState::Completed);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_commit_consumes_a_round_without_registering() {
    let h = Harness::new();
    h.wallet.fail_commit.store(true, Ordering::SeqCst);
    h.exchanger.exchange(h.params(2, 0.05)).await.unwrap();

    {
        let rounds = h.rounds.lock();
        assert_eq!(rounds.len(), 2);
        assert!(!rounds[1].success && !rounds[1].terminal);
        assert!(rounds[1].message.contains("commit"));
        assert_eq!(rounds[1].round, 1);
    }
    // nothing pending, so the very next block re-quotes
    h.exchanger.process_block(1).await.unwrap();
    assert_eq!(h.wallet.built.lock().len(), 2);
    h.exchanger.process_block(2).await.unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].message, "exceeded maximal tries");
    assert!(h.wallet.committed.lock().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_clears_pending_transactions() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    let txid = h.wallet.committed.lock()[0];
    h.exchanger.stop_exchange().await.unwrap();
    assert!(!h.exchanger.in_progress());

    h.exchanger.process_tx(txid).await.unwrap();
    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].message, "exchange stopped by user");
}

#[tokio::test(flavor = "multi_thread")]
async fn late_confirmation_after_failure_is_an_internal_error() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(1, 0.05)).await.unwrap();
    let txid = h.wallet.committed.lock()[0];
    h.exchanger.process_block(1).await.unwrap();
    h.exchanger.process_block(6).await.unwrap();
    h.exchanger.process_tx(txid).await.unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 2);
    assert!(!finished[1].success);
    assert!(finished[1].message.starts_with("internal error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn collaborator_failures_end_the_exchange() {
    let h = Harness::new();
    h.chain.pools.lock().clear();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert!(h.finished()[0].message.contains("failed to get pool"));

    h.chain.set_pool(POOL, pool(10, AMUN, ZED, 2_000_000, 1_000_000));
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert!(h.finished()[1].message.contains("native coin as token1"));

    h.chain.set_pool(POOL, pool(10, ZED, AMUN, 1_000_000, 2_000_000));
    *h.wallet.txs_per_build.lock() = Some(2);
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert_eq!(h.finished()[2].message, "expected one exchange transaction, got 2");
    assert!(h.wallet.committed.lock().is_empty());
    assert_eq!(h.metrics.exchanges_failed_total.get(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn replaced_exchange_gets_its_terminal_report() {
    let h = Harness::new();
    let first = Arc::new(Mutex::new(Vec::new()));
    h.exchanger
        .exchange(h.params_for(ZED, AMUN, first.clone(), 5, 0.05))
        .await
        .unwrap();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    assert!(h.exchanger.in_progress());
    h.exchanger.stop_exchange().await.unwrap();

    let first = first.lock().clone();
    assert_eq!(first.len(), 1);
    assert!(!first[0].success && first[0].terminal);
    assert_eq!(first[0].message, "exchange replaced by a new exchange");
    let second = h.finished();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].message, "exchange stopped by user");
    assert_eq!(h.metrics.exchanges_failed_total.get(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn exchange_between_two_tokens_is_refused() {
    let h = Harness::new();
    h.chain.set_pool("ZED/ABC", pool(10, ABC, ZED, 1_000_000, 1_000_000));
    h.exchanger
        .exchange(h.params_for(ZED, ABC, h.finished.clone(), 5, 0.05))
        .await
        .unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].message, "cross exchange not supported");
    assert!(h.wallet.committed.lock().is_empty());
    assert!(!h.exchanger.in_progress());
}

#[tokio::test(flavor = "multi_thread")]
async fn stop_is_reported_after_completion_too() {
    let h = Harness::new();
    h.exchanger.exchange(h.params(5, 0.05)).await.unwrap();
    let txid = h.wallet.committed.lock()[0];
    h.exchanger.process_tx(txid).await.unwrap();
    h.exchanger.stop_exchange().await.unwrap();

    let finished = h.finished();
    assert_eq!(finished.len(), 2);
    assert!(finished[0].success);
    assert_eq!(finished[1].message, "exchange stopped by user");
    assert_eq!(h.metrics.exchanges_completed_total.get(), 1);
    assert_eq!(h.metrics.exchanges_failed_total.get(), 0);
}
