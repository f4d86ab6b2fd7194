//! Session and UI-facing state types.

use alloy::primitives::Address;

/// Displayed in place of an unknown or unavailable stored value.
pub const STORED_VALUE_SENTINEL: &str = "0";

/// The authorized account and whether it is usable on the target chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub account: Option<Address>,
    pub connected: bool,
}

impl Session {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.connected && self.account.is_some()
    }

    /// Abbreviated account, e.g. `0xf39F...2266`.
    pub fn short_account(&self) -> Option<String> {
        self.account.map(|account| {
            let full = account.to_checksum(None);
            format!("{}...{}", &full[..6], &full[full.len() - 4..])
        })
    }
}

/// Progress of a connection attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectPhase {
    #[default]
    Idle,
    Connecting,
    SwitchingNetwork,
}

/// Progress of a value write: `Idle → Submitting → AwaitingConfirmation → Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePhase {
    #[default]
    Idle,
    Submitting,
    AwaitingConfirmation,
}

/// The single most relevant in-flight operation, for display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingOperation {
    #[default]
    None,
    Connecting,
    SwitchingNetwork,
    SubmittingTx,
    AwaitingConfirmation,
}

/// What the connect control should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No wallet provider was found.
    Unavailable,
    Disconnected,
    Connecting,
    Connected,
}

/// Snapshot of everything the UI renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub provider_available: bool,
    pub session: Session,
    /// Chain the wallet was last known to be on.
    pub active_chain: Option<u64>,
    /// Decimal string of the contract value; never empty.
    pub stored_value: String,
    pub connect_phase: ConnectPhase,
    pub write_phase: WritePhase,
    pub reading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            provider_available: false,
            session: Session::disconnected(),
            active_chain: None,
            stored_value: STORED_VALUE_SENTINEL.to_string(),
            connect_phase: ConnectPhase::Idle,
            write_phase: WritePhase::Idle,
            reading: false,
        }
    }
}

impl SessionState {
    pub fn pending_operation(&self) -> PendingOperation {
        match (self.write_phase, self.connect_phase) {
            (WritePhase::Submitting, _) => PendingOperation::SubmittingTx,
            (WritePhase::AwaitingConfirmation, _) => PendingOperation::AwaitingConfirmation,
            (WritePhase::Idle, ConnectPhase::Connecting) => PendingOperation::Connecting,
            (WritePhase::Idle, ConnectPhase::SwitchingNetwork) => {
                PendingOperation::SwitchingNetwork
            }
            (WritePhase::Idle, ConnectPhase::Idle) => PendingOperation::None,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        if !self.provider_available {
            ConnectionStatus::Unavailable
        } else if self.connect_phase != ConnectPhase::Idle {
            ConnectionStatus::Connecting
        } else if self.session.is_connected() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    /// Read and write actions may only be offered on a connected session.
    pub fn actions_available(&self) -> bool {
        self.session.is_connected()
    }

    pub fn can_write(&self) -> bool {
        self.actions_available() && self.write_phase == WritePhase::Idle
    }
}
