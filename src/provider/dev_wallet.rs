//! Private-key wallet acting as the injected provider for the CLI host.
//!
//! # Responsibilities
//! - Grant account access for a single key loaded from the environment
//! - Track known chains; switching to an unknown chain fails with 4902
//! - Add chains from `wallet_addEthereumChain` parameters
//! - Sign and broadcast `eth_sendTransaction`; forward reads to the active node
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::transports::TransportError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

use crate::config::schema::WalletConfig;
use crate::network::chain::AddChainParameter;
use crate::provider::events::ListenerRegistry;
use crate::provider::requests::{format_chain_id, parse_chain_id};
use crate::provider::types::{
    codes, methods, EventKind, Listener, ListenerId, ProviderEvent, ProviderIdentity,
    ProviderRpcError, WalletProvider,
};

/// Errors building a [`DevWallet`].
#[derive(Debug, Error)]
pub enum DevWalletError {
    #[error("Environment variable {0} not set")]
    MissingKey(String),

    #[error("Invalid private key format: {0}")]
    InvalidKey(String),

    #[error("Invalid RPC URL '{url}': {reason}")]
    InvalidRpcUrl { url: String, reason: String },
}

struct ChainEndpoint {
    name: String,
    provider: Arc<dyn Provider + Send + Sync>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwitchChainParameter {
    chain_id: String,
}

/// A single-account wallet backed by JSON-RPC nodes.
pub struct DevWallet {
    name: String,
    signer: PrivateKeySigner,
    chains: DashMap<u64, ChainEndpoint>,
    active_chain: AtomicU64,
    authorized: AtomicBool,
    listeners: ListenerRegistry,
    request_timeout: Duration,
}

impl DevWallet {
    /// Create a wallet from a hex-encoded private key, starting on `home_chain_id`.
    pub fn from_private_key(
        private_key_hex: &str,
        config: &WalletConfig,
    ) -> Result<Self, DevWalletError> {
        let key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);
        let signer: PrivateKeySigner = key_hex
            .trim()
            .parse()
            .map_err(|e| DevWalletError::InvalidKey(format!("{e}")))?;

        let wallet = Self {
            name: config.name.clone(),
            signer,
            chains: DashMap::new(),
            active_chain: AtomicU64::new(config.home_chain_id),
            authorized: AtomicBool::new(false),
            listeners: ListenerRegistry::new(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        };
        let endpoint = wallet.endpoint(
            format!("chain {}", config.home_chain_id),
            &config.home_rpc_url,
        )?;
        wallet.chains.insert(config.home_chain_id, endpoint);

        tracing::info!(
            address = %wallet.address(),
            chain_id = config.home_chain_id,
            "Dev wallet initialized"
        );
        Ok(wallet)
    }

    /// Load the key from the environment variable named in `config`.
    pub fn from_env(config: &WalletConfig) -> Result<Self, DevWalletError> {
        let private_key = std::env::var(&config.private_key_env)
            .map_err(|_| DevWalletError::MissingKey(config.private_key_env.clone()))?;
        Self::from_private_key(&private_key, config)
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn active_chain(&self) -> u64 {
        self.active_chain.load(Ordering::SeqCst)
    }

    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    /// Withdraw account access, as a user disconnecting the site would.
    #[cfg(test)]
    fn revoke(&self) {
        if self.authorized.swap(false, Ordering::SeqCst) {
            tracing::info!("Dev wallet access revoked");
            self.listeners.emit(ProviderEvent::AccountsChanged(Vec::new()));
        }
    }

    fn endpoint(&self, name: String, rpc_url: &str) -> Result<ChainEndpoint, DevWalletError> {
        let url: url::Url = rpc_url.parse().map_err(|e: url::ParseError| {
            DevWalletError::InvalidRpcUrl {
                url: rpc_url.to_string(),
                reason: e.to_string(),
            }
        })?;
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(self.signer.clone()))
            .connect_http(url);
        Ok(ChainEndpoint {
            name,
            provider: Arc::new(provider) as Arc<dyn Provider + Send + Sync>,
        })
    }

    fn active_provider(&self) -> Result<Arc<dyn Provider + Send + Sync>, ProviderRpcError> {
        let chain_id = self.active_chain();
        self.chains
            .get(&chain_id)
            .map(|endpoint| endpoint.provider.clone())
            .ok_or_else(|| {
                ProviderRpcError::new(
                    codes::CHAIN_DISCONNECTED,
                    format!("No endpoint for chain {chain_id}"),
                )
            })
    }

    fn activate(&self, chain_id: u64) {
        let previous = self.active_chain.swap(chain_id, Ordering::SeqCst);
        if previous != chain_id {
            let name = self
                .chains
                .get(&chain_id)
                .map(|endpoint| endpoint.name.clone())
                .unwrap_or_default();
            tracing::info!(chain_id, network = %name, "Dev wallet switched chain");
            self.listeners.emit(ProviderEvent::ChainChanged(chain_id));
        }
    }

    fn require_authorized(&self) -> Result<(), ProviderRpcError> {
        if self.is_authorized() {
            Ok(())
        } else {
            Err(ProviderRpcError::new(
                codes::UNAUTHORIZED,
                "The requested account has not been authorized by the user.",
            ))
        }
    }

    fn switch_chain(&self, params: Value) -> Result<Value, ProviderRpcError> {
        let [param]: [SwitchChainParameter; 1] = serde_json::from_value(params)
            .map_err(|e| ProviderRpcError::invalid_params(e.to_string()))?;
        let chain_id = parse_chain_id(&param.chain_id).ok_or_else(|| {
            ProviderRpcError::invalid_params(format!("Invalid chainId '{}'", param.chain_id))
        })?;

        if !self.chains.contains_key(&chain_id) {
            return Err(ProviderRpcError::unrecognized_chain(&param.chain_id));
        }
        self.activate(chain_id);
        Ok(Value::Null)
    }

    fn add_chain(&self, params: Value) -> Result<Value, ProviderRpcError> {
        let [param]: [AddChainParameter; 1] = serde_json::from_value(params)
            .map_err(|e| ProviderRpcError::invalid_params(e.to_string()))?;
        let chain_id = parse_chain_id(&param.chain_id).ok_or_else(|| {
            ProviderRpcError::invalid_params(format!("Invalid chainId '{}'", param.chain_id))
        })?;
        let rpc_url = param
            .rpc_urls
            .first()
            .ok_or_else(|| ProviderRpcError::invalid_params("rpcUrls must not be empty"))?;

        let endpoint = self
            .endpoint(param.chain_name.clone(), rpc_url)
            .map_err(|e| ProviderRpcError::invalid_params(e.to_string()))?;
        self.chains.insert(chain_id, endpoint);
        tracing::info!(chain_id, network = %param.chain_name, "Dev wallet added chain");

        self.activate(chain_id);
        Ok(Value::Null)
    }

    async fn send_transaction(&self, params: Value) -> Result<Value, ProviderRpcError> {
        self.require_authorized()?;
        let [tx]: [TransactionRequest; 1] = serde_json::from_value(params)
            .map_err(|e| ProviderRpcError::invalid_params(e.to_string()))?;
        if tx.from.is_some_and(|from| from != self.address()) {
            return Err(ProviderRpcError::new(
                codes::UNAUTHORIZED,
                "The requested account has not been authorized by the user.",
            ));
        }

        let provider = self.active_provider()?;
        let pending = self.bounded(provider.send_transaction(tx)).await?;
        let hash = *pending.tx_hash();
        tracing::info!(tx_hash = %hash, "Dev wallet broadcast transaction");
        Ok(json!(hash))
    }

    async fn forward(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let provider = self.active_provider()?;
        let raw_params = serde_json::value::to_raw_value(&params)
            .map_err(|e| ProviderRpcError::invalid_params(e.to_string()))?;
        let raw = self
            .bounded(provider.raw_request_dyn(method.to_owned().into(), &raw_params))
            .await?;
        serde_json::from_str(raw.get()).map_err(|e| ProviderRpcError::internal(e.to_string()))
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, ProviderRpcError> {
        match timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(rpc_failure),
            Err(_) => Err(ProviderRpcError::disconnected(format!(
                "RPC timeout after {} seconds",
                self.request_timeout.as_secs()
            ))),
        }
    }
}

/// Preserve node error codes and messages (e.g. revert reasons). Failures
/// without a JSON-RPC error response mean the node was unreachable.
fn rpc_failure(err: TransportError) -> ProviderRpcError {
    match err.as_error_resp() {
        Some(payload) => ProviderRpcError {
            code: payload.code,
            message: payload.message.to_string(),
            data: payload
                .data
                .as_ref()
                .and_then(|raw| serde_json::from_str(raw.get()).ok()),
        },
        None => ProviderRpcError::disconnected(err.to_string()),
    }
}

#[async_trait]
impl WalletProvider for DevWallet {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new(self.name.clone())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        tracing::trace!(method, "Dev wallet request");
        match method {
            methods::REQUEST_ACCOUNTS => {
                if !self.authorized.swap(true, Ordering::SeqCst) {
                    tracing::info!(address = %self.address(), "Dev wallet granted account access");
                }
                Ok(json!([self.address()]))
            }
            methods::ACCOUNTS => {
                if self.is_authorized() {
                    Ok(json!([self.address()]))
                } else {
                    Ok(json!([]))
                }
            }
            methods::CHAIN_ID => Ok(json!(format_chain_id(self.active_chain()))),
            methods::SWITCH_CHAIN => self.switch_chain(params),
            methods::ADD_CHAIN => self.add_chain(params),
            methods::SEND_TRANSACTION => self.send_transaction(params).await,
            _ => self.forward(method, params).await,
        }
    }

    fn on(&self, kind: EventKind) -> Listener {
        self.listeners.register(kind)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

impl std::fmt::Debug for DevWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevWallet")
            .field("name", &self.name)
            .field("address", &self.address())
            .field("active_chain", &self.active_chain())
            .field("authorized", &self.is_authorized())
            .finish()
    }
}
