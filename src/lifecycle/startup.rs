//! Startup orchestration and the client facade.
//!
//! # Responsibilities
//! - Locate the provider once and wire every component to it
//! - Restore a previously granted session without prompting
//! - Own the external-change watcher; rebuild state on reload
//!
//! # Design Decisions
//! - Construction is synchronous so callers can subscribe to notices
//!   before `start()` publishes anything
//! - A reload rebuilds from scratch; no partial reconciliation

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use crate::config::loader::ConfigError;
use crate::config::schema::DappConfig;
use crate::config::validation::contract_address;
use crate::contract::{Confirmation, ContractGateway, PendingWrite};
use crate::error::{ConnectError, TxError};
use crate::network::NetworkReconciler;
use crate::provider::locator::{Advisory, HostEnvironment, ProviderLocator};
use crate::provider::types::ProviderHandle;
use crate::session::connection::{ChangeWatcher, ConnectionManager};
use crate::session::notice::{Notice, Notifier};
use crate::session::state::{Session, SessionState};
use crate::session::store::SessionStore;

/// Everything the UI talks to.
pub struct DappClient {
    provider: Option<ProviderHandle>,
    advisory: Option<Advisory>,
    store: Arc<SessionStore>,
    notifier: Notifier,
    connection: ConnectionManager,
    gateway: Arc<ContractGateway>,
    watcher: Mutex<Option<ChangeWatcher>>,
}

impl DappClient {
    /// Locate the provider and build the components. Performs no I/O.
    pub fn new(config: &DappConfig, env: &HostEnvironment) -> Result<Self, ConfigError> {
        let address = contract_address(config)?;
        let spec = config.network.chain_spec();

        let located = ProviderLocator::new(config.wallet.preferred_wallet.clone()).locate(env);
        let provider = located.provider;

        let store = Arc::new(SessionStore::new(spec.chain_id, provider.is_some()));
        let notifier = Notifier::default();

        let reconciler = NetworkReconciler::new(spec)
            .with_skip_redundant_switch(config.network.skip_redundant_switch);
        let connection = ConnectionManager::new(
            provider.clone(),
            reconciler,
            store.clone(),
            notifier.clone(),
        );
        let gateway = Arc::new(ContractGateway::new(
            provider.clone(),
            address,
            store.clone(),
            notifier.clone(),
            Duration::from_millis(config.contract.confirmation_poll_ms),
        ));

        Ok(Self {
            provider,
            advisory: located.advisory,
            store,
            notifier,
            connection,
            gateway,
            watcher: Mutex::new(None),
        })
    }

    /// Publish the provider advisory, restore any authorized session, and
    /// begin following wallet events.
    pub async fn start(&self) -> Option<Session> {
        if let Some(advisory) = &self.advisory {
            self.notifier
                .publish(Notice::ProviderAdvisory(advisory.clone()));
        }

        let restored = self.connection.restore_session().await;
        if restored.as_ref().is_some_and(|s| s.connected) {
            self.gateway.read_value().await;
        }

        self.install_watcher();
        restored
    }

    fn install_watcher(&self) {
        let watcher = self
            .connection
            .observe_external_changes(self.gateway.clone());
        let mut slot = self.watcher.lock().unwrap_or_else(|e| e.into_inner());
        // Replacing drops the previous watcher, which unsubscribes it.
        *slot = watcher;
    }

    /// Rebuild all state after the wallet changed chain.
    pub async fn reload(&self) -> Option<Session> {
        tracing::info!("Reloading client state");
        self.stop_watching();
        self.store.reset_all();
        self.start().await
    }

    /// Stop following wallet events. Called on teardown.
    pub fn stop_watching(&self) {
        let watcher = self
            .watcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(watcher) = watcher {
            watcher.stop();
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(ChangeWatcher::is_running)
    }

    /// Connect the wallet and load the stored value.
    pub async fn connect(&self) -> Result<Session, ConnectError> {
        let session = self.connection.connect().await?;
        self.gateway.read_value().await;
        Ok(session)
    }

    /// Re-read the stored value.
    pub async fn refresh(&self) -> String {
        self.gateway.read_value().await
    }

    pub async fn submit_value(&self, value: &str) -> Result<PendingWrite<'_>, TxError> {
        self.gateway.submit_value(value).await
    }

    pub async fn write_value(&self, value: &str) -> Result<Confirmation, TxError> {
        self.gateway.write_value(value).await
    }

    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.notifier.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.store.snapshot()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub fn advisory(&self) -> Option<&Advisory> {
        self.advisory.as_ref()
    }

    pub fn provider(&self) -> Option<&ProviderHandle> {
        self.provider.as_ref()
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn gateway(&self) -> &Arc<ContractGateway> {
        &self.gateway
    }
}

impl Drop for DappClient {
    fn drop(&mut self) {
        self.stop_watching();
    }
}
