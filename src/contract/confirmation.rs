//! Transaction confirmation monitoring.

use alloy::primitives::{TxHash, U64};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use uuid::Uuid;

use crate::error::TxError;
use crate::provider::types::{methods, WalletProvider};

/// A write accepted into the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub ticket: Uuid,
    pub hash: TxHash,
    pub block_number: Option<u64>,
}

/// The receipt fields we act on.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReceiptSummary {
    status: Option<U64>,
    block_number: Option<U64>,
}

/// Poll `eth_getTransactionReceipt` until the transaction is mined.
///
/// A missing receipt means still pending, as does a transient provider
/// failure. A receipt with status `0x0`, or any other provider error, fails
/// the transaction with the provider's message.
pub async fn wait_for_receipt(
    provider: &dyn WalletProvider,
    ticket: Uuid,
    hash: TxHash,
    poll_interval: Duration,
) -> Result<Confirmation, TxError> {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let receipt = match provider
            .request(methods::TRANSACTION_RECEIPT, json!([hash]))
            .await
        {
            Ok(receipt) => receipt,
            Err(e) if e.is_transient() => {
                tracing::warn!(tx_hash = %hash, error = %e, "Receipt query failed, retrying");
                continue;
            }
            Err(e) => return Err(TxError::ConfirmationFailed(e.message)),
        };

        if receipt.is_null() {
            tracing::debug!(tx_hash = %hash, "Transaction pending");
            continue;
        }

        let summary = parse_receipt(receipt)?;
        if summary.status == Some(U64::ZERO) {
            return Err(TxError::ConfirmationFailed(
                "transaction reverted".to_string(),
            ));
        }

        return Ok(Confirmation {
            ticket,
            hash,
            block_number: summary.block_number.map(|n| n.to::<u64>()),
        });
    }
}

fn parse_receipt(value: Value) -> Result<ReceiptSummary, TxError> {
    serde_json::from_value(value)
        .map_err(|e| TxError::ConfirmationFailed(format!("malformed receipt: {e}")))
}
