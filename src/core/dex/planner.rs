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

//! Composite-transfer planner.
//!
//! Turns a [`CompositeTransferRequest`] and the pools it routes through into
//! a [`CompositeTransfer`]: one [`ExchangeTransfer`] per hop plus a summary
//! between the two endpoint tokens. Planning never mutates a pool; callers
//! apply the returned transfers with [`LiquidityPool::apply_transfer`] once the
//! transaction is accepted.
//!
//! Sell requests walk the path forward, feeding each hop's output into the
//! next hop. Buy requests walk it backward from the requested destination
//! amount, so each hop's cost becomes the previous hop's output.

use crate::core::dex::pricing::{buy_amount, sell_amount, PoolError};
use crate::core::error::ErrorKind;
use crate::core::types::{
    AmountRatio, CompositeTransfer, CompositeTransferRequest, ExchangeTransfer, LiquidityPool,
    NetworkAddresses, Origin, Side, TokenId, TransferLeg,
};
use std::collections::BTreeSet;
use thiserror::Error;

/// Planning errors.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DexError {
    /// Token id has no registered name.
    #[error("unknown token {0}")]
    UnknownToken(TokenId),
    /// Token name is not registered or is not a valid name.
    #[error("unknown token name {0:?}")]
    UnknownTokenName(String),
    /// Token id or name registered twice.
    #[error("duplicate token {0:?}")]
    DuplicateToken(String),
    /// Source and destination are the same token.
    #[error("identical tokens")]
    IdenticalTokens,
    /// Pool name malformed or not in canonical order.
    #[error("invalid pool name {0:?}")]
    InvalidPoolName(String),
    /// Single-pool exchange given the wrong number of pools.
    #[error("expected exactly one pool, got {0}")]
    PoolCount(usize),
    /// A requested token is not in the pool.
    #[error("token {0} not in pool")]
    TokenNotInPool(TokenId),
    /// No pools to route through.
    #[error("empty path")]
    EmptyPath,
    /// Path does not start at the source or end at the destination.
    #[error("path endpoints do not match request")]
    EndpointMismatch,
    /// Hop shares no token with the previous hop.
    #[error("path broken at hop {hop}")]
    BrokenPath {
        /// Index of the offending pool.
        hop: usize,
    },
    /// The same pool appears twice in a path.
    #[error("pool {0} used twice")]
    DuplicatePool(TokenId),
    /// Requested amount is zero.
    #[error("zero amount")]
    ZeroAmount,
    /// A hop moves nothing.
    #[error("exchange rounds down to zero")]
    ZeroOutput,
    /// Pricing failure at some hop.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl DexError {
    /// Taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DexError::Pool(e) => e.kind(),
            _ => ErrorKind::DomainError,
        }
    }
}

/// Exchange between the two tokens of exactly one pool.
pub fn pools_to_composite_exchange_transfer(
    pools: &[LiquidityPool],
    request: &CompositeTransferRequest,
) -> Result<CompositeTransfer, DexError> {
    let [pool] = pools else {
        return Err(DexError::PoolCount(pools.len()));
    };
    for token in [request.source, request.destination] {
        if !pool.contains(token) {
            return Err(DexError::TokenNotInPool(token));
        }
    }
    plan(std::slice::from_ref(pool), request)
}

/// Exchange routed through an ordered chain of pools.
pub fn cross_pools_to_composite_exchange_transfer(
    pools: &[LiquidityPool],
    request: &CompositeTransferRequest,
) -> Result<CompositeTransfer, DexError> {
    match pools.len() {
        0 => Err(DexError::EmptyPath),
        1 => pools_to_composite_exchange_transfer(pools, request),
        _ => plan(pools, request),
    }
}

/// Tokens entering each hop in walk order, followed by the destination.
pub fn trace_path(
    pools: &[LiquidityPool],
    source: TokenId,
    destination: TokenId,
) -> Result<Vec<TokenId>, DexError> {
    if pools.is_empty() {
        return Err(DexError::EmptyPath);
    }
    if source == destination {
        return Err(DexError::IdenticalTokens);
    }
    let mut seen = BTreeSet::new();
    let mut tokens = Vec::with_capacity(pools.len() + 1);
    let mut current = source;
    tokens.push(current);
    for (hop, pool) in pools.iter().enumerate() {
        if !seen.insert(pool.lp_token) {
            return Err(DexError::DuplicatePool(pool.lp_token));
        }
        current = match pool.other(current) {
            Some(next) => next,
            None if hop == 0 => return Err(DexError::EndpointMismatch),
            None => return Err(DexError::BrokenPath { hop }),
        };
        tokens.push(current);
    }
    if current != destination {
        return Err(DexError::EndpointMismatch);
    }
    Ok(tokens)
}

/// Reserves of one hop seen from the token entering the pool.
struct Hop {
    before: AmountRatio,
    after: AmountRatio,
}

fn plan(
    pools: &[LiquidityPool],
    request: &CompositeTransferRequest,
) -> Result<CompositeTransfer, DexError> {
    if request.amount == 0 {
        return Err(DexError::ZeroAmount);
    }
    let tokens = trace_path(pools, request.source, request.destination)?;
    let walk: Vec<AmountRatio> = pools
        .iter()
        .zip(&tokens)
        .map(|(pool, token)| pool.oriented(*token).ok_or(DexError::TokenNotInPool(*token)))
        .collect::<Result<_, _>>()?;

    let (hops, amount_in, amount_out) = match request.side {
        Side::Sell => walk_forward(&walk, request.amount, request.pool_interest)?,
        Side::Buy => walk_backward(&walk, request.amount, request.pool_interest)?,
    };

    let transfers = pools
        .iter()
        .zip(&tokens)
        .zip(&hops)
        .map(|((pool, entering), hop)| native_transfer(pool, *entering, hop))
        .collect();

    let first = &hops[0];
    let last = &hops[hops.len() - 1];
    let summary = ExchangeTransfer {
        token1: request.source,
        token2: request.destination,
        before: AmountRatio::new(first.before.amount1, last.before.amount2),
        after: AmountRatio::new(first.after.amount1, last.after.amount2),
    };

    Ok(CompositeTransfer {
        request: *request,
        transfers,
        summary,
        amount_in,
        amount_out,
    })
}

fn walk_forward(
    walk: &[AmountRatio],
    amount: u64,
    interest: u32,
) -> Result<(Vec<Hop>, u64, u64), DexError> {
    let mut hops = Vec::with_capacity(walk.len());
    let mut given = amount;
    for before in walk {
        let received = sell_amount(*before, given, interest)?;
        if received == 0 {
            return Err(DexError::ZeroOutput);
        }
        let after = AmountRatio::new(
            before.amount1.checked_add(given).ok_or(PoolError::RatioOverflow)?,
            before.amount2 - received,
        );
        hops.push(Hop {
            before: *before,
            after,
        });
        given = received;
    }
    Ok((hops, amount, given))
}

fn walk_backward(
    walk: &[AmountRatio],
    amount: u64,
    interest: u32,
) -> Result<(Vec<Hop>, u64, u64), DexError> {
    let mut hops = Vec::with_capacity(walk.len());
    let mut wanted = amount;
    for before in walk.iter().rev() {
        // buy_amount quotes from the side of the token leaving the pool.
        let cost = buy_amount(before.inverted(), wanted, interest)?;
        if cost == 0 {
            return Err(DexError::ZeroOutput);
        }
        let after = AmountRatio::new(
            before.amount1.checked_add(cost).ok_or(PoolError::RatioOverflow)?,
            before.amount2 - wanted,
        );
        hops.push(Hop {
            before: *before,
            after,
        });
        wanted = cost;
    }
    hops.reverse();
    Ok((hops, wanted, amount))
}

fn native_transfer(pool: &LiquidityPool, entering: TokenId, hop: &Hop) -> ExchangeTransfer {
    let (before, after) = if entering == pool.token1 {
        (hop.before, hop.after)
    } else {
        (hop.before.inverted(), hop.after.inverted())
    };
    ExchangeTransfer {
        token1: pool.token1,
        token2: pool.token2,
        before,
        after,
    }
}

impl CompositeTransfer {
    /// Money movement of this exchange: the wallet pays the source token to
    /// the LP account and the LP account pays the destination token back.
    pub fn legs(&self, addresses: &NetworkAddresses, wallet_address: &str) -> Vec<TransferLeg> {
        [
            (Origin::Wallet, Origin::LpAccount, self.request.source, self.amount_in),
            (Origin::LpAccount, Origin::Wallet, self.request.destination, self.amount_out),
        ]
        .into_iter()
        .map(|(origin, to, token, amount)| TransferLeg {
            origin,
            token,
            amount,
            destination_address: addresses.address_for(to, wallet_address),
        })
        .collect()
    }

    /// Rate the caller gets, as `(amount_in, amount_out)`.
    pub fn effective_ratio(&self) -> AmountRatio {
        AmountRatio::new(self.amount_in, self.amount_out)
    }
}
