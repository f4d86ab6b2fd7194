//! Shared utilities for integration tests: a scriptable wallet provider.
#![allow(dead_code)]

use alloy::primitives::{address, Address, Bytes, TxHash, U256};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use storage_dapp::provider::types::{
    codes, EventKind, Listener, ListenerId, ProviderEvent, ProviderIdentity, ProviderRpcError,
    WalletProvider,
};
use storage_dapp::provider::{HostEnvironment, ListenerRegistry};
use storage_dapp::{DappClient, DappConfig};

pub const ACCOUNT_A: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
pub const ACCOUNT_B: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");
pub const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";
pub const TARGET_CHAIN_HEX: &str = "0x14a34";

type Reply = Result<Value, ProviderRpcError>;

/// Provider whose responses are scripted per method.
///
/// One-shot responses queued with `respond` are used first, then the sticky
/// response set with `always`. Unscripted methods fail with 4200.
pub struct FakeProvider {
    name: String,
    queued: Mutex<HashMap<String, VecDeque<Reply>>>,
    sticky: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    log: Mutex<Vec<(String, Value)>>,
    listeners: ListenerRegistry,
}

impl FakeProvider {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            queued: Mutex::new(HashMap::new()),
            sticky: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
            listeners: ListenerRegistry::new(),
        })
    }

    pub fn metamask() -> Arc<Self> {
        Self::new("MetaMask")
    }

    /// Queue a one-shot response.
    pub fn respond(&self, method: &str, reply: Reply) -> &Self {
        self.queued
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Set the response used once the queue for `method` is empty.
    pub fn always(&self, method: &str, reply: Reply) -> &Self {
        self.sticky
            .lock()
            .unwrap()
            .insert(method.to_string(), reply);
        self
    }

    /// Hold the next request for `method` until the returned handle is notified.
    pub fn gate(&self, method: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(method.to_string(), notify.clone());
        notify
    }

    pub fn calls(&self, method: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    pub fn emit(&self, event: ProviderEvent) -> usize {
        self.listeners.emit(event)
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.count(kind)
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    fn identity(&self) -> ProviderIdentity {
        ProviderIdentity::new(self.name.clone())
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.log.lock().unwrap().push((method.to_string(), params));

        let gate = self.gates.lock().unwrap().remove(method);
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|q| q.pop_front());
        if let Some(reply) = queued {
            return reply;
        }
        let sticky = self.sticky.lock().unwrap().get(method).cloned();
        sticky.unwrap_or_else(|| Err(ProviderRpcError::unsupported(method)))
    }

    fn on(&self, kind: EventKind) -> Listener {
        self.listeners.register(kind)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

pub fn rpc_error(code: i64, message: &str) -> ProviderRpcError {
    ProviderRpcError::new(code, message)
}

pub fn user_rejected() -> ProviderRpcError {
    rpc_error(codes::USER_REJECTED, "User rejected the request.")
}

/// `eth_call` result encoding a uint256.
pub fn encoded_value(value: u64) -> Value {
    json!(Bytes::from(U256::from(value).to_be_bytes::<32>().to_vec()))
}

pub fn tx_hash() -> TxHash {
    TxHash::repeat_byte(0xab)
}

pub fn receipt(status: &str) -> Value {
    json!({
        "status": status,
        "blockNumber": "0x10",
        "transactionHash": tx_hash(),
    })
}

/// Config pointing at the test contract with fast receipt polling.
pub fn test_config() -> DappConfig {
    let mut config = DappConfig::default();
    config.contract.address = CONTRACT.to_string();
    config.contract.confirmation_poll_ms = 5;
    config.network.skip_redundant_switch = false;
    config
}

pub fn client_with(provider: &Arc<FakeProvider>) -> DappClient {
    let env = HostEnvironment::with_provider(provider.clone());
    DappClient::new(&test_config(), &env).expect("valid test config")
}

/// Script a wallet that grants `account` and switches without complaint.
pub fn script_connect(provider: &FakeProvider, account: Address) {
    provider
        .respond("eth_requestAccounts", Ok(json!([account])))
        .respond("wallet_switchEthereumChain", Ok(Value::Null));
}

/// Client connected as `ACCOUNT_A` with the displayed value set to `value`.
pub async fn connected_client(provider: &Arc<FakeProvider>, value: u64) -> DappClient {
    script_connect(provider, ACCOUNT_A);
    provider.respond("eth_call", Ok(encoded_value(value)));
    let client = client_with(provider);
    client.connect().await.expect("scripted connect succeeds");
    client
}

/// Let spawned watcher tasks drain their queues.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Collect every notice published so far.
pub fn drain(rx: &mut tokio::sync::broadcast::Receiver<storage_dapp::session::Notice>) -> Vec<storage_dapp::session::Notice> {
    let mut notices = Vec::new();
    while let Ok(notice) = rx.try_recv() {
        notices.push(notice);
    }
    notices
}
