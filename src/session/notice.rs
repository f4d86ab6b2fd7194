//! User-facing notifications.

use alloy::primitives::{Address, TxHash};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::FailureKind;
use crate::provider::locator::Advisory;

/// Display severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Something the UI should tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    ProviderAdvisory(Advisory),
    Connected {
        account: Address,
    },
    ConnectionFailed {
        kind: FailureKind,
        message: String,
    },
    AccountChanged {
        account: Address,
    },
    Disconnected,
    TxSubmitted {
        ticket: Uuid,
        hash: TxHash,
    },
    TxConfirmed {
        ticket: Uuid,
        hash: TxHash,
        block_number: Option<u64>,
    },
    TxFailed {
        ticket: Uuid,
        kind: FailureKind,
        message: String,
    },
    /// The wallet changed chain; all chain-bound state must be rebuilt.
    ReloadRequired {
        chain_id: u64,
    },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::ProviderAdvisory(_) => Severity::Warning,
            Notice::Connected { .. } | Notice::TxConfirmed { .. } => Severity::Success,
            Notice::ConnectionFailed { .. } | Notice::TxFailed { .. } => Severity::Error,
            Notice::AccountChanged { .. }
            | Notice::Disconnected
            | Notice::TxSubmitted { .. }
            | Notice::ReloadRequired { .. } => Severity::Info,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Notice::ProviderAdvisory(advisory) => &advisory.title,
            Notice::Connected { .. } => "Connected",
            Notice::ConnectionFailed { .. } => "Connection Error",
            Notice::AccountChanged { .. } => "Account Changed",
            Notice::Disconnected => "Disconnected",
            Notice::TxSubmitted { .. } => "Transaction Sent",
            Notice::TxConfirmed { .. } => "Success",
            Notice::TxFailed { .. } => "Error",
            Notice::ReloadRequired { .. } => "Network Changed",
        }
    }

    pub fn description(&self) -> String {
        match self {
            Notice::ProviderAdvisory(advisory) => advisory.message.clone(),
            Notice::Connected { .. } => "Wallet connected successfully!".to_string(),
            Notice::ConnectionFailed { message, .. } | Notice::TxFailed { message, .. } => {
                message.clone()
            }
            Notice::AccountChanged { account } => format!("Now using {account}"),
            Notice::Disconnected => "Wallet access was revoked".to_string(),
            Notice::TxSubmitted { .. } => "Waiting for confirmation...".to_string(),
            Notice::TxConfirmed { .. } => "Value updated successfully!".to_string(),
            Notice::ReloadRequired { chain_id } => {
                format!("Wallet switched to chain {chain_id}; reloading")
            }
        }
    }
}

/// Fan-out of notices to any number of UI consumers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a notice. Dropped silently when nobody is listening.
    pub fn publish(&self, notice: Notice) {
        tracing::debug!(title = notice.title(), "Notice published");
        let _ = self.tx.send(notice);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}
