//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::network::chain::{ChainSpec, NativeCurrency, BASE_SEPOLIA_CHAIN_ID};

/// Root configuration for the dapp client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DappConfig {
    /// Target network the wallet must be on.
    pub network: NetworkConfig,

    /// Storage contract settings.
    pub contract: ContractConfig,

    /// Wallet selection and dev-wallet host settings.
    pub wallet: WalletConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Target network definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Numeric chain id (84532 for Base Sepolia).
    pub chain_id: u64,

    /// Display name passed to the wallet when adding the chain.
    pub name: String,

    pub native_currency: NativeCurrency,

    /// RPC endpoints, in preference order.
    pub rpc_urls: Vec<String>,

    pub block_explorer_urls: Vec<String>,

    /// Skip `wallet_switchEthereumChain` when the wallet is already on target.
    pub skip_redundant_switch: bool,
}

impl NetworkConfig {
    pub fn chain_spec(&self) -> ChainSpec {
        ChainSpec {
            chain_id: self.chain_id,
            name: self.name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: self.rpc_urls.clone(),
            block_explorer_urls: self.block_explorer_urls.clone(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        let spec = ChainSpec::base_sepolia();
        Self {
            chain_id: spec.chain_id,
            name: spec.name,
            native_currency: spec.native_currency,
            rpc_urls: spec.rpc_urls,
            block_explorer_urls: spec.block_explorer_urls,
            skip_redundant_switch: true,
        }
    }
}

/// Storage contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address (hex).
    pub address: String,

    /// Receipt polling interval while awaiting confirmation, in milliseconds.
    pub confirmation_poll_ms: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: String::new(),
            confirmation_poll_ms: 1000,
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Wallet implementation to prefer when several are injected.
    pub preferred_wallet: String,

    /// Name the dev wallet reports as its identity.
    pub name: String,

    /// Environment variable holding the dev wallet's private key.
    pub private_key_env: String,

    /// Chain the dev wallet starts on.
    pub home_chain_id: u64,

    /// RPC endpoint for the home chain.
    pub home_rpc_url: String,

    /// Timeout for requests the dev wallet forwards to a node, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            preferred_wallet: "MetaMask".to_string(),
            name: "dev-wallet".to_string(),
            private_key_env: "DAPP_WALLET_PRIVATE_KEY".to_string(),
            home_chain_id: BASE_SEPOLIA_CHAIN_ID,
            home_rpc_url: "https://sepolia.base.org".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the pretty format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_base_sepolia() {
        let config = DappConfig::default();
        let spec = config.network.chain_spec();
        assert_eq!(spec, ChainSpec::base_sepolia());
        assert!(config.network.skip_redundant_switch);
        assert_eq!(config.contract.confirmation_poll_ms, 1000);
        assert_eq!(config.wallet.preferred_wallet, "MetaMask");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DappConfig = toml::from_str(
            r#"
            [contract]
            address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"

            [network.native_currency]
            name = "Sepolia Ether"
            symbol = "ETH"
            decimals = 18
            "#,
        )
        .unwrap();
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.network.native_currency.name, "Sepolia Ether");
        assert_eq!(config.contract.confirmation_poll_ms, 1000);
    }
}
