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

//! Canonical token-pair order and pool names.
//!
//! In direct order the native coin is always token2; two non-native tokens
//! are ordered by name. A pool is named `<token2>/<token1>`, so every pool
//! quoted in the native coin reads `XYZ/AMUN`-style from the right.

use crate::core::dex::planner::DexError;
use crate::core::interfaces::TokenRegistry;
use crate::core::types::TokenId;
use std::collections::BTreeMap;

const SEPARATOR: char = '/';

/// Registry backed by two in-memory maps, populated once at start-up.
#[derive(Clone, Debug)]
pub struct StaticTokenRegistry {
    native: TokenId,
    names: BTreeMap<TokenId, String>,
    ids: BTreeMap<String, TokenId>,
}

impl StaticTokenRegistry {
    /// New registry holding only the native coin.
    pub fn new(native: TokenId, native_name: &str) -> Self {
        let mut names = BTreeMap::new();
        let mut ids = BTreeMap::new();
        names.insert(native, native_name.to_string());
        ids.insert(native_name.to_string(), native);
        Self { native, names, ids }
    }

    /// Register a token. Names must be non-empty, unique and free of `/`.
    pub fn register(&mut self, id: TokenId, name: &str) -> Result<(), DexError> {
        if name.is_empty() || name.contains(SEPARATOR) {
            return Err(DexError::UnknownTokenName(name.to_string()));
        }
        if self.names.contains_key(&id) || self.ids.contains_key(name) {
            return Err(DexError::DuplicateToken(name.to_string()));
        }
        self.names.insert(id, name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(())
    }
}

impl TokenRegistry for StaticTokenRegistry {
    fn token_id_to_name(&self, id: TokenId) -> Option<String> {
        self.names.get(&id).cloned()
    }

    fn name_to_id(&self, name: &str) -> Option<TokenId> {
        self.ids.get(name).copied()
    }

    fn is_native_coin(&self, id: TokenId) -> bool {
        id == self.native
    }
}

fn name_of<R: TokenRegistry + ?Sized>(registry: &R, id: TokenId) -> Result<String, DexError> {
    registry
        .token_id_to_name(id)
        .ok_or(DexError::UnknownToken(id))
}

/// Order `(a, b)` as `(token1, token2)`.
pub fn direct_order<R: TokenRegistry + ?Sized>(
    registry: &R,
    a: TokenId,
    b: TokenId,
) -> Result<(TokenId, TokenId), DexError> {
    if a == b {
        return Err(DexError::IdenticalTokens);
    }
    let name_a = name_of(registry, a)?;
    let name_b = name_of(registry, b)?;
    if registry.is_native_coin(a) {
        return Ok((b, a));
    }
    if registry.is_native_coin(b) {
        return Ok((a, b));
    }
    if name_a <= name_b {
        Ok((a, b))
    } else {
        Ok((b, a))
    }
}

/// Canonical pool name for an unordered pair.
pub fn tokens_to_lpname<R: TokenRegistry + ?Sized>(
    registry: &R,
    a: TokenId,
    b: TokenId,
) -> Result<String, DexError> {
    let (token1, token2) = direct_order(registry, a, b)?;
    Ok(format!(
        "{}{}{}",
        name_of(registry, token2)?,
        SEPARATOR,
        name_of(registry, token1)?
    ))
}

/// Split a pool name into `(token1, token2)`.
///
/// Fails unless the name is in canonical order.
pub fn lpname_to_tokens<R: TokenRegistry + ?Sized>(
    registry: &R,
    lpname: &str,
) -> Result<(TokenId, TokenId), DexError> {
    let (left, right) = lpname
        .split_once(SEPARATOR)
        .ok_or_else(|| DexError::InvalidPoolName(lpname.to_string()))?;
    if left.is_empty() || right.is_empty() || left == right {
        return Err(DexError::InvalidPoolName(lpname.to_string()));
    }
    let token2 = registry
        .name_to_id(left)
        .ok_or_else(|| DexError::UnknownTokenName(left.to_string()))?;
    let token1 = registry
        .name_to_id(right)
        .ok_or_else(|| DexError::UnknownTokenName(right.to_string()))?;
    if direct_order(registry, token1, token2)? != (token1, token2) {
        return Err(DexError::InvalidPoolName(lpname.to_string()));
    }
    Ok((token1, token2))
}

/// True if `lpname` names a pool of two known tokens in canonical order.
pub fn validate_lpname<R: TokenRegistry + ?Sized>(registry: &R, lpname: &str) -> bool {
    lpname_to_tokens(registry, lpname).is_ok()
}
