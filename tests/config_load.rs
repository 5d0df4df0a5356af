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

use amunchain_dex::core::config::{ConfigError, DexConfig};
use amunchain_dex::core::error::ErrorKind;
use amunchain_dex::core::types::{NetworkType, COIN};
use std::io::Write;

const MINIMAL: &str = r#"
[network]
network = "testnet"
lp_account_address = "lp-account"
"#;

#[test]
fn minimal_file_takes_defaults() {
    let cfg = DexConfig::from_toml_str(MINIMAL).unwrap();
    assert_eq!(cfg.exchange.blocks_between_rounds, 5);
    assert_eq!(cfg.exchange.default_max_rounds, 10);
    assert_eq!(cfg.exchange.pool_interest, 3);
    assert_eq!(cfg.mining.min_stake_amount, COIN);
    assert_eq!(cfg.mining.poll_interval_ms, 1_000);
    let addrs = cfg.network_addresses();
    assert_eq!(addrs.network, NetworkType::Testnet);
    assert_eq!(addrs.lp_account_address, "lp-account");
}

#[test]
fn sections_override_defaults() {
    let raw = format!("{MINIMAL}\n[exchange]\npool_interest = 10\n\n[mining]\nstake_maturity_blocks = 60\n");
    let cfg = DexConfig::from_toml_str(&raw).unwrap();
    assert_eq!(cfg.exchange.pool_interest, 10);
    assert_eq!(cfg.exchange.default_fake_outs, 15);
    assert_eq!(cfg.mining.stake_maturity_blocks, 60);
}

#[test]
fn bad_values_are_rejected() {
    let raw = format!("{MINIMAL}\n[exchange]\npool_interest = 1001\n");
    let e = DexConfig::from_toml_str(&raw).unwrap_err();
    assert!(matches!(e, ConfigError::Invalid("exchange.pool_interest")));
    assert_eq!(e.kind(), ErrorKind::DomainError);

    let e = DexConfig::from_toml_str("[network]\nnetwork = \"moonnet\"\nlp_account_address = \"x\"\n").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ParseError);

    let e = DexConfig::from_toml_str("[network]\nnetwork = \"mainnet\"\nlp_account_address = \"\"\n").unwrap_err();
    assert!(matches!(e, ConfigError::Invalid(_)));
}

#[test]
fn load_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MINIMAL.as_bytes()).unwrap();
    let cfg = DexConfig::load(file.path()).unwrap();
    assert_eq!(cfg.network.network, NetworkType::Testnet);

    let missing = file.path().with_extension("missing");
    assert!(matches!(DexConfig::load(missing), Err(ConfigError::Read)));
}
