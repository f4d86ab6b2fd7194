//! Typed wrappers over the untyped provider request surface.

use alloy::primitives::Address;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::provider::types::{methods, ProviderRpcError, WalletProvider};

/// Prompting account access (`eth_requestAccounts`).
pub async fn request_accounts(
    provider: &dyn WalletProvider,
) -> Result<Vec<Address>, ProviderRpcError> {
    let value = provider.request(methods::REQUEST_ACCOUNTS, json!([])).await?;
    decode(methods::REQUEST_ACCOUNTS, value)
}

/// Already-authorized accounts, without prompting (`eth_accounts`).
pub async fn accounts(provider: &dyn WalletProvider) -> Result<Vec<Address>, ProviderRpcError> {
    let value = provider.request(methods::ACCOUNTS, json!([])).await?;
    decode(methods::ACCOUNTS, value)
}

/// Chain the wallet is currently on (`eth_chainId`).
pub async fn chain_id(provider: &dyn WalletProvider) -> Result<u64, ProviderRpcError> {
    let value = provider.request(methods::CHAIN_ID, json!([])).await?;
    let raw: String = decode(methods::CHAIN_ID, value)?;
    parse_chain_id(&raw).ok_or_else(|| {
        ProviderRpcError::internal(format!("{}: malformed chain id '{raw}'", methods::CHAIN_ID))
    })
}

/// Deserialize a provider result, reporting the method on mismatch.
pub fn decode<T: DeserializeOwned>(method: &str, value: Value) -> Result<T, ProviderRpcError> {
    serde_json::from_value(value)
        .map_err(|e| ProviderRpcError::internal(format!("{method}: unexpected response: {e}")))
}

/// Parse a chain id as wallets report it: `0x`-prefixed hex, or decimal.
pub fn parse_chain_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// Format a chain id the way wallets expect it in requests.
pub fn format_chain_id(chain_id: u64) -> String {
    format!("{chain_id:#x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_id() {
        assert_eq!(parse_chain_id("0x14a34"), Some(84532));
        assert_eq!(parse_chain_id("0X1"), Some(1));
        assert_eq!(parse_chain_id("84532"), Some(84532));
        assert_eq!(parse_chain_id("0xzz"), None);
    }

    #[test]
    fn test_format_chain_id() {
        assert_eq!(format_chain_id(84532), "0x14a34");
        assert_eq!(parse_chain_id(&format_chain_id(8453)), Some(8453));
    }

    #[test]
    fn test_decode_accounts() {
        let accounts: Vec<Address> = decode(
            methods::ACCOUNTS,
            json!(["0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"]),
        )
        .unwrap();
        assert_eq!(accounts.len(), 1);

        let err = decode::<Vec<Address>>(methods::ACCOUNTS, json!("nope")).unwrap_err();
        assert!(err.message.starts_with("eth_accounts"));
    }
}
