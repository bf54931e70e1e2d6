use std::path::Path;

use anyhow::Result;
use ember_core::serialize::decimal;
use ember_core::{Account, Address, Balance, Transaction};
use ember_state::WorldState;
use ember_vm::TransferEnv;
use serde::{Deserialize, Serialize};

/// Node configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Chain ID
    pub chain_id: u64,

    /// Gas available to the transactions of one block
    pub block_gas_limit: u64,

    /// Account credited with block fees
    pub coinbase: Address,

    /// Default log filter, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Flat execution gas per message call
    #[serde(default)]
    pub call_gas: u64,

    /// Flat execution gas per contract creation
    #[serde(default)]
    pub create_gas: u64,

    /// Genesis allocation
    pub genesis: Vec<GenesisAccount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisAccount {
    pub address: Address,
    #[serde(with = "decimal")]
    pub balance: Balance,
    #[serde(default)]
    pub nonce: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            chain_id: 1,
            block_gas_limit: 8_000_000,
            coinbase: Address::ZERO,
            log_level: default_log_level(),
            call_gas: 0,
            create_gas: 0,
            genesis: Vec::new(),
        }
    }
}

impl NodeConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: NodeConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// World state holding the genesis allocation
    pub fn genesis_state(&self) -> WorldState {
        WorldState::from_genesis(
            self.genesis
                .iter()
                .map(|entry| (entry.address, Account::new(entry.balance.clone(), entry.nonce))),
        )
    }

    /// Execution environment with the configured flat gas costs
    pub fn environment(&self) -> TransferEnv {
        TransferEnv::new()
            .with_call_gas(self.call_gas)
            .with_create_gas(self.create_gas)
    }
}

/// Generate a sample configuration for testing
pub fn generate_sample_config() -> NodeConfig {
    NodeConfig {
        coinbase: Address::random(),
        call_gas: 2_000,
        create_gas: 32_000,
        genesis: vec![
            GenesisAccount {
                address: Address::random(),
                balance: Balance::from(1_000_000_000_000_000_000u64),
                nonce: 0,
            },
            GenesisAccount {
                address: Address::random(),
                balance: Balance::from(1_000_000_000u64),
                nonce: 0,
            },
        ],
        ..NodeConfig::default()
    }
}

/// A block spending from the first two genesis accounts of `config`
pub fn generate_sample_block(config: &NodeConfig) -> Vec<Transaction> {
    let [first, second, ..] = config.genesis.as_slice() else {
        return Vec::new();
    };
    let (alice, bob) = (first.address, second.address);

    vec![
        Transaction::call(alice, bob, first.nonce)
            .with_gas(30_000)
            .with_gas_price(1u32)
            .with_value(1_000_000u32),
        Transaction::call(alice, bob, first.nonce + 1)
            .with_gas(50_000)
            .with_gas_price(2u32)
            .with_data(vec![0xca, 0xfe]),
        Transaction::create(alice, first.nonce + 2)
            .with_gas(120_000)
            .with_gas_price(1u32)
            .with_value(5_000u32)
            .with_data(vec![0x60, 0x80, 0x60, 0x40]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_state::StateDb;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert_eq!(config.chain_id, 1);
        assert_eq!(config.log_level, "info");
        assert!(config.genesis.is_empty());
    }

    #[test]
    fn test_sample_config_round_trips_through_json() {
        let config = generate_sample_config();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: NodeConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(back.coinbase, config.coinbase);
        assert_eq!(back.genesis, config.genesis);
        assert!(json.contains("\"1000000000000000000\""));
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{
            "chain_id": 7,
            "block_gas_limit": 1000000,
            "coinbase": "0x0000000000000000000000000000000000000001",
            "genesis": [
                { "address": "0x00000000000000000000000000000000000000aa", "balance": "0x10" }
            ]
        }"#;
        let config: NodeConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.call_gas, 0);
        assert_eq!(config.genesis[0].nonce, 0);
        assert_eq!(config.genesis[0].balance, Balance::from(16u32));
    }

    #[test]
    fn test_genesis_state() {
        let config = generate_sample_config();
        let state = config.genesis_state();
        for entry in &config.genesis {
            assert_eq!(state.get_balance(&entry.address), entry.balance);
        }
    }

    #[test]
    fn test_sample_block_uses_genesis_nonces() {
        let mut config = generate_sample_config();
        config.genesis[0].nonce = 4;
        let block = generate_sample_block(&config);

        assert_eq!(block.len(), 3);
        assert_eq!(block[0].nonce, 4);
        assert_eq!(block[2].nonce, 6);
        assert!(generate_sample_block(&NodeConfig::default()).is_empty());
    }
}
