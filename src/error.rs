//! Failure taxonomy for wallet and contract operations.

use thiserror::Error;

use crate::provider::types::ProviderRpcError;

/// Coarse failure category, used for notices and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    CapabilityUnavailable,
    NoAccounts,
    NetworkSwitchFailed,
    TxSubmissionFailed,
    TxConfirmationFailed,
    ReadFailed,
    /// Rejected locally before any provider call was made.
    Rejected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::CapabilityUnavailable => "capability_unavailable",
            FailureKind::NoAccounts => "no_accounts",
            FailureKind::NetworkSwitchFailed => "network_switch_failed",
            FailureKind::TxSubmissionFailed => "tx_submission_failed",
            FailureKind::TxConfirmationFailed => "tx_confirmation_failed",
            FailureKind::ReadFailed => "read_failed",
            FailureKind::Rejected => "rejected",
        }
    }
}

/// Errors from establishing a wallet session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectError {
    #[error("No wallet provider available. Please install MetaMask")]
    CapabilityUnavailable,

    /// Another connection attempt is still in flight.
    #[error("A connection attempt is already in progress")]
    AlreadyPending,

    #[error("Failed to connect wallet: {0}")]
    AccountAccess(ProviderRpcError),

    #[error("No accounts found")]
    NoAccounts,

    #[error("Failed to switch to {network} network")]
    NetworkSwitchFailed { network: String },
}

impl ConnectError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ConnectError::CapabilityUnavailable => FailureKind::CapabilityUnavailable,
            ConnectError::AlreadyPending => FailureKind::Rejected,
            ConnectError::AccountAccess(_) | ConnectError::NoAccounts => FailureKind::NoAccounts,
            ConnectError::NetworkSwitchFailed { .. } => FailureKind::NetworkSwitchFailed,
        }
    }
}

/// Errors from submitting a value-changing transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    #[error("No wallet provider available")]
    CapabilityUnavailable,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Enter a value to store")]
    EmptyValue,

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// A write is already between submission and confirmation.
    #[error("Another transaction is still pending")]
    Busy,

    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),

    #[error("Transaction failed: {0}")]
    ConfirmationFailed(String),
}

impl TxError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TxError::CapabilityUnavailable => FailureKind::CapabilityUnavailable,
            TxError::SubmissionFailed(_) => FailureKind::TxSubmissionFailed,
            TxError::ConfirmationFailed(_) => FailureKind::TxConfirmationFailed,
            TxError::NotConnected
            | TxError::EmptyValue
            | TxError::InvalidValue(_)
            | TxError::Busy => FailureKind::Rejected,
        }
    }

    /// Whether a transaction reached the provider before failing.
    pub fn was_broadcast_attempted(&self) -> bool {
        matches!(
            self,
            TxError::SubmissionFailed(_) | TxError::ConfirmationFailed(_)
        )
    }
}

/// Errors from reading the stored value. Recovered locally by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("No wallet provider available")]
    CapabilityUnavailable,

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("A read is already in progress")]
    Busy,

    #[error("Error fetching value: {0}")]
    ReadFailed(String),
}

impl ReadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ReadError::CapabilityUnavailable => FailureKind::CapabilityUnavailable,
            ReadError::NotConnected | ReadError::Busy => FailureKind::Rejected,
            ReadError::ReadFailed(_) => FailureKind::ReadFailed,
        }
    }
}
