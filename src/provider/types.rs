//! Provider trait, EIP-1193 error codes and event types.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;

/// JSON-RPC method names consumed from the provider.
pub mod methods {
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const CHAIN_ID: &str = "eth_chainId";
    pub const SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
    pub const ADD_CHAIN: &str = "wallet_addEthereumChain";
    pub const CALL: &str = "eth_call";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
}

/// Well-known provider error codes (EIP-1193 and JSON-RPC 2.0).
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    /// The requested chain has not been added to the wallet.
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL: i64 = -32603;
}

/// Error returned by a provider request.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(codes::INVALID_PARAMS, message)
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(
            codes::UNSUPPORTED_METHOD,
            format!("The provider does not support the requested method: {method}"),
        )
    }

    pub fn unrecognized_chain(chain_id: &str) -> Self {
        Self::new(
            codes::UNRECOGNIZED_CHAIN,
            format!("Unrecognized chain ID \"{chain_id}\". Try adding the chain first."),
        )
    }

    /// True when the wallet does not know the requested chain.
    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == codes::UNRECOGNIZED_CHAIN
    }

    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::new(codes::DISCONNECTED, message)
    }

    /// The provider lost its connection rather than answering; the same
    /// request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self.code, codes::DISCONNECTED | codes::CHAIN_DISCONNECTED)
    }
}

/// Push notifications a provider can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    AccountsChanged,
    ChainChanged,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AccountsChanged => "accountsChanged",
            EventKind::ChainChanged => "chainChanged",
        }
    }
}

/// Payload of a provider push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Ordered list of authorized accounts; empty once access is revoked.
    AccountsChanged(Vec<Address>),
    /// Newly active chain id.
    ChainChanged(u64),
}

impl ProviderEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ProviderEvent::AccountsChanged(_) => EventKind::AccountsChanged,
            ProviderEvent::ChainChanged(_) => EventKind::ChainChanged,
        }
    }
}

/// Identifier returned by [`WalletProvider::on`], used to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// A registered event listener.
#[derive(Debug)]
pub struct Listener {
    pub id: ListenerId,
    pub events: mpsc::UnboundedReceiver<ProviderEvent>,
}

/// How an injected provider describes itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Wallet implementation name, e.g. "MetaMask".
    pub name: String,
}

impl ProviderIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Whether this provider claims to be the given wallet implementation.
    pub fn identifies_as(&self, wallet: &str) -> bool {
        self.name.eq_ignore_ascii_case(wallet)
    }
}

/// An injected wallet capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Self-reported identity of the wallet.
    fn identity(&self) -> ProviderIdentity;

    /// Issue a JSON-RPC request through the wallet.
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    /// Subscribe to a push notification.
    fn on(&self, kind: EventKind) -> Listener;

    /// Remove a listener previously returned by [`WalletProvider::on`].
    fn remove_listener(&self, id: ListenerId);
}

/// Shared handle to the single active provider.
pub type ProviderHandle = Arc<dyn WalletProvider>;
