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

//! Default [`FastHash`] backend.

use crate::core::interfaces::FastHash;
use crate::core::types::H256;
use ring::digest;

/// SHA-256 via `ring`. Stands in for the chain's native fast hash wherever
/// the host does not inject its own.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hash;

impl FastHash for Sha256Hash {
    fn fast_hash(&self, data: &[u8]) -> H256 {
        let d = digest::digest(&digest::SHA256, data);
        let mut out = [0u8; 32];
        out.copy_from_slice(d.as_ref());
        H256::from_bytes(out)
    }
}
