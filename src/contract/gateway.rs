//! Reads and writes of the stored value through the wallet provider.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::contract::abi;
use crate::contract::confirmation::{wait_for_receipt, Confirmation};
use crate::error::{ReadError, TxError};
use crate::observability::metrics;
use crate::provider::requests;
use crate::provider::types::{methods, ProviderHandle};
use crate::session::notice::{Notice, Notifier};
use crate::session::state::WritePhase;
use crate::session::store::{Lane, PendingGuard, SessionStore};

/// Gateway to the fixed storage contract.
pub struct ContractGateway {
    provider: Option<ProviderHandle>,
    address: Address,
    store: Arc<SessionStore>,
    notifier: Notifier,
    poll_interval: Duration,
}

impl ContractGateway {
    pub fn new(
        provider: Option<ProviderHandle>,
        address: Address,
        store: Arc<SessionStore>,
        notifier: Notifier,
        poll_interval: Duration,
    ) -> Self {
        Self {
            provider,
            address,
            store,
            notifier,
            poll_interval,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Refresh the displayed value and return it.
    ///
    /// Failures are logged and leave the previous value in place.
    pub async fn read_value(&self) -> String {
        let fetched = self.fetch_value().await;
        self.record_read(fetched)
    }

    /// Like [`Self::read_value`], but waits for an in-flight read instead of
    /// skipping, so the result reflects state after this call began.
    pub async fn read_value_queued(&self) -> String {
        let fetched = self.fetch_value_queued().await;
        self.record_read(fetched)
    }

    fn record_read(&self, fetched: Result<U256, ReadError>) -> String {
        match fetched {
            Ok(value) => {
                let shown = value.to_string();
                self.store.set_stored_value(shown.clone());
                metrics::record_read("ok");
                tracing::debug!(value = %shown, "Stored value refreshed");
                shown
            }
            Err(ReadError::ReadFailed(reason)) => {
                tracing::warn!(error = %reason, "Error fetching value; keeping last displayed value");
                metrics::record_read("failed");
                self.store.stored_value()
            }
            Err(e) => {
                tracing::debug!(reason = %e, "Value refresh skipped");
                metrics::record_read("skipped");
                self.store.stored_value()
            }
        }
    }

    /// Call `getValue()` without touching the store's displayed value.
    pub async fn fetch_value(&self) -> Result<U256, ReadError> {
        self.readable()?;
        let _guard = self.store.try_begin(Lane::Read).ok_or(ReadError::Busy)?;
        let provider = self.readable()?;
        self.call_get_value(provider).await
    }

    async fn fetch_value_queued(&self) -> Result<U256, ReadError> {
        self.readable()?;
        let _guard = self.store.begin(Lane::Read).await;
        let provider = self.readable()?;
        self.call_get_value(provider).await
    }

    /// Reads are only meaningful on a connected session, which implies the
    /// wallet is on the target chain.
    fn readable(&self) -> Result<&ProviderHandle, ReadError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(ReadError::CapabilityUnavailable)?;
        if !self.store.session().is_connected() {
            return Err(ReadError::NotConnected);
        }
        Ok(provider)
    }

    async fn call_get_value(&self, provider: &ProviderHandle) -> Result<U256, ReadError> {
        let params = json!([
            { "to": self.address, "data": abi::get_value_calldata() },
            "latest"
        ]);
        let raw = provider
            .request(methods::CALL, params)
            .await
            .map_err(|e| ReadError::ReadFailed(e.to_string()))?;
        let data: Bytes = requests::decode(methods::CALL, raw)
            .map_err(|e| ReadError::ReadFailed(e.message))?;

        abi::decode_value(&data).map_err(|e| ReadError::ReadFailed(e.to_string()))
    }

    /// Broadcast `setValue(value)` and return once the wallet accepts it.
    ///
    /// The write lane stays claimed by the returned [`PendingWrite`] until it
    /// is confirmed, fails, or is dropped.
    pub async fn submit_value(&self, value: &str) -> Result<PendingWrite<'_>, TxError> {
        let provider = self
            .provider
            .as_ref()
            .ok_or(TxError::CapabilityUnavailable)?;

        let session = self.store.session();
        let account = match (session.connected, session.account) {
            (true, Some(account)) => account,
            _ => return Err(self.reject(TxError::NotConnected)),
        };
        if value.trim().is_empty() {
            return Err(self.reject(TxError::EmptyValue));
        }
        let amount = abi::parse_value(value).map_err(|e| self.reject(TxError::InvalidValue(e)))?;

        let guard = self
            .store
            .try_begin(Lane::Write)
            .ok_or_else(|| self.reject(TxError::Busy))?;
        self.store.set_write_phase(WritePhase::Submitting);

        let ticket = Uuid::new_v4();
        let params = json!([{
            "from": account,
            "to": self.address,
            "data": abi::set_value_calldata(amount),
        }]);

        let submitted = provider
            .request(methods::SEND_TRANSACTION, params)
            .await
            .and_then(|raw| requests::decode::<TxHash>(methods::SEND_TRANSACTION, raw));

        let hash = match submitted {
            Ok(hash) => hash,
            Err(e) => {
                let err = TxError::SubmissionFailed(e.message);
                self.fail(ticket, &err);
                return Err(err);
            }
        };

        self.store.set_write_phase(WritePhase::AwaitingConfirmation);
        tracing::info!(%ticket, tx_hash = %hash, value = %amount, "Transaction sent, waiting for confirmation");
        metrics::record_tx("submitted");
        self.notifier.publish(Notice::TxSubmitted { ticket, hash });

        Ok(PendingWrite {
            gateway: self,
            provider: provider.clone(),
            ticket,
            hash,
            _guard: guard,
        })
    }

    /// Submit and wait for the outcome.
    pub async fn write_value(&self, value: &str) -> Result<Confirmation, TxError> {
        self.submit_value(value).await?.confirmed().await
    }

    fn reject(&self, err: TxError) -> TxError {
        tracing::debug!(reason = %err, "Write rejected before broadcast");
        metrics::record_tx("rejected");
        err
    }

    fn fail(&self, ticket: Uuid, err: &TxError) {
        tracing::error!(%ticket, error = %err, "Update error");
        metrics::record_tx(err.kind().as_str());
        self.notifier.publish(Notice::TxFailed {
            ticket,
            kind: err.kind(),
            message: err.to_string(),
        });
    }
}

impl std::fmt::Debug for ContractGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractGateway")
            .field("address", &self.address)
            .field("provider_available", &self.provider.is_some())
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

/// A broadcast write awaiting its outcome. Holds the write lane.
pub struct PendingWrite<'a> {
    gateway: &'a ContractGateway,
    provider: ProviderHandle,
    ticket: Uuid,
    hash: TxHash,
    _guard: PendingGuard<'a>,
}

impl std::fmt::Debug for PendingWrite<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingWrite")
            .field("ticket", &self.ticket)
            .field("hash", &self.hash)
            .finish_non_exhaustive()
    }
}

impl PendingWrite<'_> {
    pub fn ticket(&self) -> Uuid {
        self.ticket
    }

    pub fn tx_hash(&self) -> TxHash {
        self.hash
    }

    /// Wait for the transaction to be mined, then refresh the stored value.
    ///
    /// The write lane is released only after the refresh completes.
    pub async fn confirmed(self) -> Result<Confirmation, TxError> {
        let gateway = self.gateway;
        let outcome = wait_for_receipt(
            self.provider.as_ref(),
            self.ticket,
            self.hash,
            gateway.poll_interval,
        )
        .await;

        match outcome {
            Ok(confirmation) => {
                tracing::info!(
                    ticket = %self.ticket,
                    tx_hash = %self.hash,
                    block_number = ?confirmation.block_number,
                    "Value updated successfully"
                );
                metrics::record_tx("confirmed");
                gateway.notifier.publish(Notice::TxConfirmed {
                    ticket: self.ticket,
                    hash: self.hash,
                    block_number: confirmation.block_number,
                });
                gateway.read_value_queued().await;
                Ok(confirmation)
            }
            Err(err) => {
                gateway.fail(self.ticket, &err);
                Err(err)
            }
        }
    }
}
