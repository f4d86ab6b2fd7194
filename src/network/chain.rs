//! Chain specification for the target network.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::provider::requests::format_chain_id;

/// Base Sepolia testnet.
pub const BASE_SEPOLIA_CHAIN_ID: u64 = 84532;

/// Native currency metadata shown by the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for NativeCurrency {
    fn default() -> Self {
        Self {
            name: "ETH".to_string(),
            symbol: "ETH".to_string(),
            decimals: 18,
        }
    }
}

/// The network the session must be on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSpec {
    pub chain_id: u64,
    pub name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl ChainSpec {
    pub fn base_sepolia() -> Self {
        Self {
            chain_id: BASE_SEPOLIA_CHAIN_ID,
            name: "Base Sepolia".to_string(),
            native_currency: NativeCurrency::default(),
            rpc_urls: vec!["https://sepolia.base.org".to_string()],
            block_explorer_urls: vec!["https://sepolia.basescan.org".to_string()],
        }
    }

    /// Chain id as a `0x`-prefixed hex string.
    pub fn hex_chain_id(&self) -> String {
        format_chain_id(self.chain_id)
    }

    /// Params for `wallet_switchEthereumChain`.
    pub fn switch_params(&self) -> Value {
        json!([{ "chainId": self.hex_chain_id() }])
    }

    /// Params for `wallet_addEthereumChain`.
    pub fn add_chain_params(&self) -> Value {
        json!([AddChainParameter::from(self)])
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::base_sepolia()
    }
}

/// Wire form of an EIP-3085 `wallet_addEthereumChain` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameter {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
}

impl From<&ChainSpec> for AddChainParameter {
    fn from(spec: &ChainSpec) -> Self {
        Self {
            chain_id: spec.hex_chain_id(),
            chain_name: spec.name.clone(),
            native_currency: spec.native_currency.clone(),
            rpc_urls: spec.rpc_urls.clone(),
            block_explorer_urls: spec.block_explorer_urls.clone(),
        }
    }
}
