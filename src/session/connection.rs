//! Wallet connection lifecycle.
//!
//! # Responsibilities
//! - `connect()`: account access, network reconciliation, session commit
//! - Restore a previously granted session without prompting
//! - Follow `accountsChanged` / `chainChanged` for the provider's lifetime

use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::contract::ContractGateway;
use crate::error::ConnectError;
use crate::network::NetworkReconciler;
use crate::observability::metrics;
use crate::provider::requests;
use crate::provider::types::{EventKind, ListenerId, ProviderEvent, ProviderHandle, WalletProvider};
use crate::session::notice::{Notice, Notifier};
use crate::session::state::{ConnectPhase, Session};
use crate::session::store::{Lane, SessionStore};

/// Owns the account/session lifecycle. The only writer of [`Session`].
pub struct ConnectionManager {
    provider: Option<ProviderHandle>,
    reconciler: NetworkReconciler,
    store: Arc<SessionStore>,
    notifier: Notifier,
}

impl ConnectionManager {
    pub fn new(
        provider: Option<ProviderHandle>,
        reconciler: NetworkReconciler,
        store: Arc<SessionStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            provider,
            reconciler,
            store,
            notifier,
        }
    }

    pub fn reconciler(&self) -> &NetworkReconciler {
        &self.reconciler
    }

    /// Request account access and bring the wallet onto the target chain.
    ///
    /// Returns [`ConnectError::AlreadyPending`] without side effects while
    /// another attempt is in flight. Any other failure resets the session.
    pub async fn connect(&self) -> Result<Session, ConnectError> {
        let Some(provider) = self.provider.as_ref() else {
            let err = ConnectError::CapabilityUnavailable;
            tracing::warn!("Connect requested but no wallet provider is available");
            metrics::record_connect(err.kind().as_str());
            self.notifier.publish(Notice::ConnectionFailed {
                kind: err.kind(),
                message: err.to_string(),
            });
            return Err(err);
        };

        let Some(_guard) = self.store.try_begin(Lane::Connect) else {
            tracing::debug!("Connect ignored: attempt already in progress");
            return Err(ConnectError::AlreadyPending);
        };
        self.store.set_connect_phase(ConnectPhase::Connecting);

        match self.establish(provider.as_ref()).await {
            Ok((account, session)) => {
                tracing::info!(account = %account, "Wallet connected");
                metrics::record_connect("connected");
                self.notifier.publish(Notice::Connected { account });
                Ok(session)
            }
            Err(err) => {
                tracing::error!(error = %err, "Connection error");
                self.store.reset_session();
                metrics::record_connect(err.kind().as_str());
                self.notifier.publish(Notice::ConnectionFailed {
                    kind: err.kind(),
                    message: err.to_string(),
                });
                Err(err)
            }
        }
    }

    async fn establish(
        &self,
        provider: &dyn WalletProvider,
    ) -> Result<(Address, Session), ConnectError> {
        let epoch = self.store.account_epoch();
        let accounts = requests::request_accounts(provider)
            .await
            .map_err(ConnectError::AccountAccess)?;
        let account = *accounts.first().ok_or(ConnectError::NoAccounts)?;

        self.store.set_connect_phase(ConnectPhase::SwitchingNetwork);
        if !self.reconciler.ensure_target_chain(provider).await {
            return Err(ConnectError::NetworkSwitchFailed {
                network: self.reconciler.target().name.clone(),
            });
        }

        // The wallet may have reported other accounts while we were suspended.
        let session = self
            .store
            .commit_session(account, epoch)
            .ok_or(ConnectError::NoAccounts)?;
        let account = session.account.unwrap_or(account);
        Ok((account, session))
    }

    /// Adopt an already-authorized account without prompting the user.
    ///
    /// The session is only marked connected if the wallet is already on the
    /// target chain.
    pub async fn restore_session(&self) -> Option<Session> {
        let provider = self.provider.as_ref()?;

        let accounts = match requests::accounts(provider.as_ref()).await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!(error = %e, "Could not query authorized accounts");
                return None;
            }
        };
        let account = *accounts.first()?;

        let chain = match requests::chain_id(provider.as_ref()).await {
            Ok(chain) => Some(chain),
            Err(e) => {
                tracing::warn!(error = %e, "Could not query active chain");
                None
            }
        };

        let session = self.store.restore_session(account, chain);
        tracing::info!(
            account = %account,
            chain_id = ?chain,
            connected = session.connected,
            "Restored previously authorized account"
        );
        Some(session)
    }

    /// Subscribe to account and chain changes until the returned watcher is
    /// dropped. Account switches trigger a value refresh through `gateway`.
    pub fn observe_external_changes(&self, gateway: Arc<ContractGateway>) -> Option<ChangeWatcher> {
        let provider = self.provider.clone()?;

        let accounts = provider.on(EventKind::AccountsChanged);
        let chains = provider.on(EventKind::ChainChanged);
        let listeners = [accounts.id, chains.id];

        let task = tokio::spawn(follow_changes(
            accounts.events,
            chains.events,
            self.store.clone(),
            self.notifier.clone(),
            gateway,
        ));

        tracing::debug!("Watching wallet account and chain changes");
        Some(ChangeWatcher {
            provider,
            listeners,
            task,
        })
    }
}

async fn follow_changes(
    mut accounts: mpsc::UnboundedReceiver<ProviderEvent>,
    mut chains: mpsc::UnboundedReceiver<ProviderEvent>,
    store: Arc<SessionStore>,
    notifier: Notifier,
    gateway: Arc<ContractGateway>,
) {
    loop {
        let event = tokio::select! {
            Some(event) = accounts.recv() => event,
            Some(event) = chains.recv() => event,
            else => break,
        };

        match event {
            ProviderEvent::AccountsChanged(list) => {
                metrics::record_external_event(EventKind::AccountsChanged.as_str());
                apply_accounts_changed(&store, &notifier, &gateway, &list).await;
            }
            ProviderEvent::ChainChanged(chain_id) => {
                metrics::record_external_event(EventKind::ChainChanged.as_str());
                tracing::info!(chain_id, "Wallet chain changed; state must be reloaded");
                store.reset_all();
                notifier.publish(Notice::ReloadRequired { chain_id });
            }
        }
    }
}

async fn apply_accounts_changed(
    store: &SessionStore,
    notifier: &Notifier,
    gateway: &ContractGateway,
    accounts: &[Address],
) {
    match accounts.first() {
        Some(&account) => {
            let connected = store.adopt_account(account);
            tracing::info!(account = %account, connected, "Wallet account changed");
            notifier.publish(Notice::AccountChanged { account });
            if connected {
                gateway.read_value().await;
            }
        }
        None => {
            tracing::info!("Wallet accounts cleared; disconnecting");
            store.reset_disconnected();
            notifier.publish(Notice::Disconnected);
        }
    }
}

/// Live subscription to provider events. Dropping it unsubscribes.
pub struct ChangeWatcher {
    provider: ProviderHandle,
    listeners: [ListenerId; 2],
    task: JoinHandle<()>,
}

impl ChangeWatcher {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Remove both listeners and stop the event task.
    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        for id in self.listeners {
            self.provider.remove_listener(id);
        }
        self.task.abort();
        tracing::debug!("Stopped watching wallet changes");
    }
}
