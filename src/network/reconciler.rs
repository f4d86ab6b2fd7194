//! Brings the wallet onto the target chain.
//!
//! # Responsibilities
//! - Request `wallet_switchEthereumChain` for the target chain
//! - Add the chain with its full spec when the wallet reports 4902
//! - Report failure as `false`; never retry
//!
//! Switching is visible to the wallet's other listeners: a `chainChanged`
//! notification may arrive after this returns.

use crate::network::chain::ChainSpec;
use crate::observability::metrics;
use crate::provider::requests;
use crate::provider::types::{methods, WalletProvider};

/// Reconciles the wallet's active chain against a fixed target.
#[derive(Debug, Clone)]
pub struct NetworkReconciler {
    target: ChainSpec,
    skip_redundant_switch: bool,
}

impl NetworkReconciler {
    pub fn new(target: ChainSpec) -> Self {
        Self {
            target,
            skip_redundant_switch: false,
        }
    }

    /// Query `eth_chainId` first and skip the switch when already on target.
    pub fn with_skip_redundant_switch(mut self, skip: bool) -> Self {
        self.skip_redundant_switch = skip;
        self
    }

    pub fn target(&self) -> &ChainSpec {
        &self.target
    }

    /// Ensure the wallet is on the target chain.
    pub async fn ensure_target_chain(&self, provider: &dyn WalletProvider) -> bool {
        if self.skip_redundant_switch {
            match requests::chain_id(provider).await {
                Ok(current) if current == self.target.chain_id => {
                    tracing::debug!(chain_id = current, "Wallet already on target chain");
                    metrics::record_network_reconcile("already_on_target");
                    return true;
                }
                Ok(current) => {
                    tracing::debug!(
                        current,
                        target = self.target.chain_id,
                        "Wallet on a different chain"
                    );
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Could not read active chain; switching anyway");
                }
            }
        }

        match provider
            .request(methods::SWITCH_CHAIN, self.target.switch_params())
            .await
        {
            Ok(_) => {
                tracing::info!(
                    chain_id = %self.target.hex_chain_id(),
                    network = %self.target.name,
                    "Switched wallet to target network"
                );
                metrics::record_network_reconcile("switched");
                true
            }
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(network = %self.target.name, "Target chain unknown to wallet, adding it");
                self.add_target_chain(provider).await
            }
            Err(e) => {
                tracing::error!(error = %e, network = %self.target.name, "Error switching network");
                metrics::record_network_reconcile("failed");
                false
            }
        }
    }

    async fn add_target_chain(&self, provider: &dyn WalletProvider) -> bool {
        match provider
            .request(methods::ADD_CHAIN, self.target.add_chain_params())
            .await
        {
            Ok(_) => {
                tracing::info!(network = %self.target.name, "Target network added to wallet");
                metrics::record_network_reconcile("added");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, network = %self.target.name, "Error adding network");
                metrics::record_network_reconcile("failed");
                false
            }
        }
    }
}
