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

use amunchain_dex::core::dex::naming::{
    direct_order, lpname_to_tokens, tokens_to_lpname, validate_lpname, StaticTokenRegistry,
};
use amunchain_dex::core::dex::planner::DexError;
use amunchain_dex::core::types::TokenId;
use proptest::prelude::*;
use std::collections::BTreeSet;

const NATIVE: TokenId = TokenId(0);

fn registry_with(names: &BTreeSet<String>) -> (StaticTokenRegistry, Vec<TokenId>) {
    let mut r = StaticTokenRegistry::new(NATIVE, "amun");
    let mut ids = vec![NATIVE];
    for (i, name) in names.iter().enumerate() {
        let id = TokenId(i as u64 + 1);
        r.register(id, name).unwrap();
        ids.push(id);
    }
    (r, ids)
}

#[test]
fn identical_tokens_have_no_pool() {
    let (r, _) = registry_with(&BTreeSet::from(["ABC".to_string()]));
    assert_eq!(direct_order(&r, TokenId(1), TokenId(1)), Err(DexError::IdenticalTokens));
    assert_eq!(tokens_to_lpname(&r, TokenId(1), TokenId(7)), Err(DexError::UnknownToken(TokenId(7))));
}

proptest! {
    #[test]
    fn canonical_names_round_trip(
        names in proptest::collection::btree_set("[A-Z]{3,6}", 2..8),
        i in any::<prop::sample::Index>(),
        j in any::<prop::sample::Index>(),
    ) {
        let (r, ids) = registry_with(&names);
        let x = ids[i.index(ids.len())];
        let y = ids[j.index(ids.len())];
        prop_assume!(x != y);

        let name = tokens_to_lpname(&r, x, y).unwrap();
        prop_assert!(validate_lpname(&r, &name));
        prop_assert_eq!(tokens_to_lpname(&r, y, x).unwrap(), name.clone());

        let (t1, t2) = lpname_to_tokens(&r, &name).unwrap();
        prop_assert_eq!(BTreeSet::from([t1, t2]), BTreeSet::from([x, y]));
        if x == NATIVE || y == NATIVE {
            prop_assert_eq!(t2, NATIVE);
        }

        let (left, right) = name.split_once('/').unwrap();
        let swapped = format!("{right}/{left}");
        prop_assert!(!validate_lpname(&r, &swapped));
    }
}
